pub mod retry_policy_test;
