pub mod action;
pub mod resolver;
pub mod table;

pub use action::ActionKind;
pub use resolver::{resolve, resolve_reading, ResolvedRecommendation};
pub use table::{AirlinePolicy, PolicyRule, PolicyTable};

/// Lookup key for a free-text airline name: whitespace stripped, lower-cased.
pub fn normalize_airline(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize_airline;

    #[test]
    fn strips_all_whitespace() {
        assert_eq!(normalize_airline("  Viva\tAero bus "), "vivaaerobus");
        assert_eq!(normalize_airline(""), "");
    }
}
