//! # Code Section Verification Resolver
//!
//! ## Purpose
//! Section ranges written with dashes are ambiguous ("§ 1331-1332" may be a
//! range or a single hyphenated section), so extraction can produce sections
//! that do not exist. The code text service answers a missing section with a
//! redirect to its not-found page; probing the link without following
//! redirects separates real sections from artifacts, and verified misses are
//! dropped from the result set.

use super::{ResolverContext, ResolverOutcome};
use crate::citation::Citation;
use tracing::{info, warn};

pub(crate) async fn verify_code_section(
    ctx: &ResolverContext<'_>,
    mut citation: Citation,
) -> ResolverOutcome {
    citation.checked.mark_code_verified();

    let url = citation
        .links
        .get("house")
        .and_then(|link| link.html.clone());
    let url = match url {
        Some(url) => url,
        None => return ResolverOutcome::pass_through(citation),
    };

    match ctx.providers.govinfo.check_document_exists(&url).await {
        Ok(true) => ResolverOutcome::pass_through(citation),
        Ok(false) => {
            info!(id = %citation.id, "code section does not resolve, dropping citation");
            ResolverOutcome::default()
        }
        Err(e) => {
            // A transport failure is not a verified miss; keep the citation.
            warn!(id = %citation.id, error = %e, category = e.category(),
                "existence check failed");
            ResolverOutcome::pass_through(citation)
        }
    }
}
