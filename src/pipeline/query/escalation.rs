//! Narrow/broad query selection and candidate gathering.

use std::collections::HashSet;

use futures_util::future::join;

use super::types::{CandidatePool, CompiledQuery, ValidatedBlock};
use crate::models::{BroadStrategy, QueryStrength};
use crate::pipeline::literature::{LiteratureSource, SourceError};
use crate::pipeline_config::{CandidateLimits, CountThresholds, EscalationConfig};

fn block_clauses(blocks: &[ValidatedBlock]) -> Vec<&str> {
    blocks.iter().filter_map(|b| b.combined_clause()).collect()
}

/// AND of every non-empty block clause, in block order.
pub fn narrow_clause(blocks: &[ValidatedBlock]) -> Option<String> {
    let clauses = block_clauses(blocks);
    (!clauses.is_empty()).then(|| clauses.join(" AND "))
}

/// A relaxation of the narrow clause; its blocks are always a subset.
pub fn broad_clause(blocks: &[ValidatedBlock], strategy: BroadStrategy) -> Option<String> {
    let clauses = block_clauses(blocks);
    let first = clauses.first()?;
    match strategy {
        BroadStrategy::DropLastBlock if clauses.len() > 2 => {
            Some(clauses[..clauses.len() - 1].join(" AND "))
        }
        BroadStrategy::DropLastBlock | BroadStrategy::FirstBlockOnly => Some(first.to_string()),
    }
}

/// Pick the query to execute from the two hit counts.
pub fn choose_strength(narrow: u64, broad: u64, t: &CountThresholds) -> QueryStrength {
    let comfortable = (t.sparse_below..=t.comfortable_max).contains(&narrow);
    if comfortable || narrow > t.oversized_above {
        return QueryStrength::Narrow;
    }
    if narrow < t.sparse_below {
        // Keep the empty narrow result visible when broadening finds nothing either.
        return if broad > 0 {
            QueryStrength::Broad
        } else {
            QueryStrength::Narrow
        };
    }
    // Between the comfortable range and the oversized bound.
    QueryStrength::Narrow
}

/// Build both clauses, count them and choose one. `None` when no block
/// produced a clause.
pub async fn compile_query<S: LiteratureSource>(
    blocks: &[ValidatedBlock],
    config: &EscalationConfig,
    source: &S,
) -> Option<CompiledQuery> {
    let narrow = narrow_clause(blocks)?;
    let broad = broad_clause(blocks, config.broad_strategy)?;

    let (narrow_count, broad_count) = if broad == narrow {
        let count = source.count(&narrow).await;
        (count, count)
    } else {
        join(source.count(&narrow), source.count(&broad)).await
    };

    let strength = choose_strength(narrow_count, broad_count, &config.thresholds);
    let chosen = match strength {
        QueryStrength::Narrow => narrow.clone(),
        QueryStrength::Broad => broad.clone(),
    };

    tracing::info!(
        narrow_count,
        broad_count,
        strength = strength.as_str(),
        "Search strategy chosen"
    );

    Some(CompiledQuery {
        narrow,
        broad,
        chosen,
        strength,
        narrow_count,
        broad_count,
    })
}

/// Run the chosen query, append network neighbors of the top hits and cap
/// the pool.
pub async fn gather_candidates<S: LiteratureSource>(
    source: &S,
    query: &CompiledQuery,
    limits: &CandidateLimits,
) -> Result<CandidatePool, SourceError> {
    let primary = source.search(&query.chosen, limits.search_limit).await?;
    let seeds = &primary[..primary.len().min(limits.expansion_seeds)];
    let neighbors = source
        .expand_by_network(seeds, limits.neighbors_per_seed)
        .await;

    let from_search = primary.len();
    let mut seen: HashSet<String> = primary.iter().cloned().collect();
    let mut ids = primary;
    let mut from_network = 0;
    for id in neighbors {
        if seen.insert(id.clone()) {
            ids.push(id);
            from_network += 1;
        }
    }
    ids.truncate(limits.max_candidates);

    tracing::info!(
        from_search,
        from_network,
        kept = ids.len(),
        "Candidate pool assembled"
    );

    Ok(CandidatePool {
        ids,
        from_search,
        from_network,
    })
}
