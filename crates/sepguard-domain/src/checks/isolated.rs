//! Sub-domains of `isolated_app_all` may only gain permissions over the base
//! `isolated_app` through the configured exception table.

use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig, IsolatedPolicy};
use sepguard_policy::{Policy, TeQuery};
use std::collections::BTreeSet;

const BASE_DOMAIN: &str = "isolated_app";
const FAMILY_ATTRIBUTE: &str = "isolated_app_all";

const HEADER: &str = "Found prohibited permission granted for isolated like types. \
Please replace your allow statements that involve \"-isolated_app\" with \
\"-isolated_app_all\". Violations are shown as the following: \n";

/// One expanded permission: target, class, perm.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Grant {
    target: String,
    class: String,
    perm: String,
}

fn grants_of(pol: &Policy, source: &str) -> BTreeSet<Grant> {
    pol.query_expanded_te_rules(&TeQuery::new().source(source))
        .flat_map(|rule| {
            rule.perms.iter().map(|perm| Grant {
                target: rule.target.clone(),
                class: rule.class.clone(),
                perm: perm.clone(),
            })
        })
        .collect()
}

struct Exceptions<'a> {
    pol: &'a Policy,
    table: &'a IsolatedPolicy,
    compute_allowed: BTreeSet<String>,
}

impl<'a> Exceptions<'a> {
    fn new(pol: &'a Policy, table: &'a IsolatedPolicy) -> Self {
        let compute_allowed = table
            .compute_allowed_attributes
            .iter()
            .filter_map(|attr| pol.members(attr))
            .flatten()
            .cloned()
            .collect();
        Self {
            pol,
            table,
            compute_allowed,
        }
    }

    /// Client access to a HAL server is judged against the HAL, not the
    /// concrete server type.
    fn resolve_hal_server<'t>(&'t self, target: &'t str) -> &'t str {
        for attr in &self.table.hal_server_attributes {
            if self.pol.members(attr).is_some_and(|m| m.contains(target)) {
                return attr.rsplit_once('_').map_or(attr.as_str(), |(hal, _)| hal);
            }
        }
        target
    }

    fn is_violation(&self, grant: &Grant) -> bool {
        let target = self.resolve_hal_server(&grant.target);
        let compute_allowed = self.compute_allowed.contains(target)
            && self.table.compute_allowed_classes.contains(&grant.class);
        if compute_allowed {
            return false;
        }
        let listed = self
            .table
            .permissions
            .get(target)
            .is_some_and(|classes| classes.contains(&grant.class));
        !listed || self.table.forbidden_perms.contains(&grant.perm)
    }
}

pub fn run(
    ctx: &CheckContext<'_>,
    cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let pol = ctx.policy;
    let family = pol.query_type_attribute(FAMILY_ATTRIBUTE, true)?;
    let base = grants_of(pol, BASE_DOMAIN);
    let exceptions = Exceptions::new(pol, &cfg.isolated);

    let mut ret = String::new();
    for sub in family.iter().filter(|t| t.as_str() != BASE_DOMAIN) {
        if policy.allow.contains(sub) {
            continue;
        }
        let own = [sub.clone(), format!("{sub}_userfaultfd")];
        let delta = grants_of(pol, sub)
            .into_iter()
            .filter(|g| !own.contains(&g.target))
            .filter(|g| !base.contains(g));
        for grant in delta.filter(|g| exceptions.is_violation(g)) {
            ret += &format!(
                "allow {sub} {}:{} {} \n",
                grant.target, grant.class, grant.perm
            );
        }
    }

    if ret.is_empty() {
        return Ok(ret);
    }
    tracing::debug!(check = "isolated", "prohibited grants found");
    Ok(format!("{HEADER}{ret}"))
}
