// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use scanvault::config::settings::Settings;
    use scanvault::utils::retry_policy::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn test_policy_from_default_settings() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let policy = RetryPolicy::from(&settings.retry);

        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(500));
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(1));
        assert_eq!(policy.calculate_backoff(3), Duration::from_secs(2));
        assert_eq!(policy.calculate_backoff(10), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_override_limits_attempts() {
        let policy = RetryPolicy::default().with_max_retries(1);
        assert!(policy.should_retry(0));
        assert!(!policy.should_retry(1));

        let none = RetryPolicy::none();
        assert!(!none.should_retry(0));
    }
}
