//! Validation predicates shared by the `nutype` domain types.

/// Rejects glob metacharacters (`*`, `?`, `[`, `]`).
///
/// Stream ids double as employee keys, so they stay free of characters a
/// store might later interpret as patterns.
pub fn no_glob_metacharacters(s: &str) -> bool {
    !s.contains(['*', '?', '[', ']'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn strings_without_metacharacters_pass_validation(s in "[^*?\\[\\]]*") {
            prop_assert!(no_glob_metacharacters(&s));
        }

        #[test]
        fn strings_with_a_metacharacter_fail_validation(
            prefix in "[a-z0-9-]{0,16}",
            metachar in prop_oneof![Just('*'), Just('?'), Just('['), Just(']')],
            suffix in "[a-z0-9-]{0,16}",
        ) {
            let candidate = format!("{prefix}{metachar}{suffix}");
            prop_assert!(!no_glob_metacharacters(&candidate));
        }
    }

    #[test]
    fn typical_employee_keys_pass_validation() {
        assert!(no_glob_metacharacters("employee-123"));
        assert!(no_glob_metacharacters("acme/paris/jdoe"));
        assert!(no_glob_metacharacters("jane.doe@example.com"));
    }
}
