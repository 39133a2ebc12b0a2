use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@:](\w+)").unwrap());

/// Parameter names referenced by `@name` or `:name`, deduplicated in first-seen order.
pub fn placeholders(sql: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for captures in PLACEHOLDER.captures_iter(sql) {
        if let Some(name) = captures.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_prefixes_in_order() {
        assert_eq!(placeholders("select * from t where a = @A and b = :b_2"), vec!["A", "b_2"]);
    }

    #[test]
    fn repeated_names_appear_once() {
        assert_eq!(placeholders("@x + @y - @x"), vec!["x", "y"]);
    }

    #[test]
    fn bare_prefixes_are_ignored() {
        assert!(placeholders("select '@' , ':' from t").is_empty());
    }
}
