//! # Resolution Engine
//!
//! ## Purpose
//! Drives the iterative fixed-point resolution of a citation batch. Each
//! round dispatches every queued citation concurrently to its single
//! applicable resolver strategy; the strategies answer with finished
//! citations, replacement citations and newly discovered parallel citations,
//! which together form the next round's queue. The iteration ends when a
//! round produces no further work.
//!
//! ## Concurrency Model
//! I/O-concurrent, not CPU-parallel: all of a round's resolver calls are in
//! flight simultaneously and the round completes when the slowest call
//! returns. Rounds are strictly sequential because a round's queue is only
//! known once its predecessor finished. Resolvers receive their citation by
//! value and return deltas; nothing in a round writes shared state, and the
//! engine alone merges results between rounds.
//!
//! ## Parallel Citation Ownership
//! Discovered parallel citations are queued for one further pass so their
//! own links and titles resolve, tagged with the identity of the top-level
//! citation whose list owns them. When such a pass completes, the engine
//! folds the updated citation back into the owner's `parallel_citations`
//! entry (replace-by-id). Cross-references of cross-references are never
//! followed, keeping the recursion depth at exactly one.
//!
//! ## Failure Model
//! Resolution never fails a batch: provider failures degrade to missing
//! enrichment, and only a verified non-existence check removes a citation
//! from the output.

use crate::citation::Citation;
use crate::config::ResolutionConfig;
use crate::providers::ProviderClients;
use crate::registry::CitationRegistry;
use crate::resolver::{resolve_citation, ResolverContext};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Process-lifetime resolution counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionStats {
    /// Batches resolved
    pub batches: u64,
    /// Citations received
    pub citations_in: u64,
    /// Citations returned (explosion and filtering change the count)
    pub citations_out: u64,
    /// Fixed-point rounds run
    pub rounds: u64,
}

/// A queued unit of work. Tokens identify one produced top-level citation
/// across rounds; payload ids cannot, since an exploded citation can yield
/// several top-level entries with identical payloads.
struct WorkItem {
    cite: Citation,
    role: WorkRole,
}

enum WorkRole {
    /// A top-level citation, carrying its identity token
    TopLevel { token: u64 },
    /// A parallel citation, carrying the token of the top-level citation
    /// whose `parallel_citations` list owns it
    Parallel { owner: u64 },
}

/// The citation resolution engine
pub struct ResolutionEngine {
    registry: Arc<CitationRegistry>,
    providers: Arc<ProviderClients>,
    config: ResolutionConfig,
    stats: RwLock<ResolutionStats>,
}

impl ResolutionEngine {
    pub fn new(
        registry: Arc<CitationRegistry>,
        providers: Arc<ProviderClients>,
        config: ResolutionConfig,
    ) -> Self {
        Self {
            registry,
            providers,
            config,
            stats: RwLock::new(ResolutionStats::default()),
        }
    }

    pub async fn stats(&self) -> ResolutionStats {
        self.stats.read().await.clone()
    }

    /// Resolve a batch of top-level citations to its fixed point. The output
    /// holds the surviving top-level citations, each with links, metadata and
    /// a populated depth-1 `parallel_citations` list.
    pub async fn resolve(&self, citations: Vec<Citation>) -> Vec<Citation> {
        let input_count = citations.len();
        let mut next_token: u64 = 0;
        let mut token = || {
            next_token += 1;
            next_token
        };

        let mut queue: Vec<WorkItem> = citations
            .into_iter()
            .map(|mut cite| {
                cite.mark_top_level();
                WorkItem {
                    cite,
                    role: WorkRole::TopLevel { token: token() },
                }
            })
            .collect();

        // Finished top-level citations, keyed by their identity token.
        let mut finished: Vec<(u64, Citation)> = Vec::new();
        let mut merges: Vec<(u64, Citation)> = Vec::new();
        let mut rounds: u64 = 0;

        while !queue.is_empty() {
            if rounds as usize >= self.config.max_rounds {
                warn!(
                    queued = queue.len(),
                    "round limit reached, flushing unfinished citations"
                );
                for item in queue.drain(..) {
                    match item.role {
                        WorkRole::TopLevel { token } => finished.push((token, item.cite)),
                        WorkRole::Parallel { owner } => merges.push((owner, item.cite)),
                    }
                }
                break;
            }
            rounds += 1;
            debug!(round = rounds, queued = queue.len(), "starting resolution round");

            let ctx = ResolverContext {
                registry: &self.registry,
                providers: &self.providers,
            };
            let work: Vec<WorkItem> = queue.drain(..).collect();
            let outcomes = join_all(work.into_iter().map(|item| {
                let ctx = &ctx;
                async move { (item.role, resolve_citation(ctx, item.cite).await) }
            }))
            .await;

            for (role, outcome) in outcomes {
                match role {
                    WorkRole::TopLevel { token: own_token } => {
                        // The input's token passes to the first citation it
                        // resolved into; further explosion products get
                        // their own identity.
                        let mut next = Some(own_token);
                        for resolved in outcome.finished {
                            let owner = next.take().unwrap_or_else(&mut token);
                            finished.push((owner, resolved.cite));
                            for cite in resolved.discovered {
                                queue.push(WorkItem {
                                    cite,
                                    role: WorkRole::Parallel { owner },
                                });
                            }
                        }
                        for mut resolved in outcome.queue_top_level {
                            let owner = next.take().unwrap_or_else(&mut token);
                            resolved.cite.mark_top_level();
                            queue.push(WorkItem {
                                cite: resolved.cite,
                                role: WorkRole::TopLevel { token: owner },
                            });
                            for cite in resolved.discovered {
                                queue.push(WorkItem {
                                    cite,
                                    role: WorkRole::Parallel { owner },
                                });
                            }
                        }
                    }
                    WorkRole::Parallel { owner } => {
                        // A queued parallel citation. Finished passes and
                        // replacement explosions both fold back into the
                        // owner's list; replacements run one more pass for
                        // their own enrichment. Discoveries made by parallel
                        // citations are dropped: depth stays at one.
                        for resolved in outcome.finished {
                            merges.push((owner, resolved.cite));
                        }
                        for resolved in outcome.queue_top_level {
                            merges.push((owner, resolved.cite.clone()));
                            queue.push(WorkItem {
                                cite: resolved.cite,
                                role: WorkRole::Parallel { owner },
                            });
                        }
                    }
                }
            }
        }

        // Fold processed parallel citations back into their owners, in
        // chronological order so the most-processed version wins.
        for (owner_token, mut cite) in merges {
            cite.parallel_citations = None;
            match finished.iter_mut().find(|(tok, _)| *tok == owner_token) {
                Some((_, parent)) => parent.merge_parallel_entry(cite),
                None => debug!(id = %cite.id,
                    "dropping parallel update with no surviving owner"),
            }
        }

        let finished: Vec<Citation> = finished.into_iter().map(|(_, cite)| cite).collect();

        {
            let mut stats = self.stats.write().await;
            stats.batches += 1;
            stats.citations_in += input_count as u64;
            stats.citations_out += finished.len() as u64;
            stats.rounds += rounds;
        }
        debug!(
            citations_in = input_count,
            citations_out = finished.len(),
            rounds,
            "resolution complete"
        );

        finished
    }
}
