use crate::policy::CheckPolicy;

pub const NONE: [&str; 0] = [];

/// The policy's tolerated types, borrowed for the assertion helpers.
pub fn allowed_types(policy: &CheckPolicy) -> Vec<&str> {
    policy.allow.iter().map(String::as_str).collect()
}

pub fn sorted_joined<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut items: Vec<&str> = items.into_iter().collect();
    items.sort_unstable();
    items.join(" ")
}
