use fitcoach_backend::auth::{classify, decide, guard_applies, AccessClass, GuardDecision};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn redirect(target: &str) -> GuardDecision {
    GuardDecision::Redirect(target.to_string())
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn coach_paths_without_credential_go_to_login(rest in "[a-zA-Z0-9/_-]{0,32}") {
        let path = format!("/coach{rest}");
        prop_assert_eq!(decide(&path, false), redirect("/login"));
    }

    #[test]
    fn client_app_paths_without_credential_go_to_client_login(rest in "[a-zA-Z0-9/_-]{0,32}") {
        let path = format!("/client/app{rest}");
        prop_assert_eq!(decide(&path, false), redirect("/client/login"));
    }

    #[test]
    fn credential_never_redirects_away_from_protected_paths(rest in "(/[a-z0-9-]{1,12}){0,4}") {
        prop_assert_eq!(decide(&format!("/coach{rest}"), true), GuardDecision::Allow);
        prop_assert_eq!(decide(&format!("/client/app{rest}"), true), GuardDecision::Allow);
    }

    #[test]
    fn exactly_one_access_class_per_path(path in "/[a-z/]{0,24}") {
        let class = classify(&path);
        let expected = if path.starts_with("/coach") {
            AccessClass::CoachProtected
        } else if path.starts_with("/client/app") {
            AccessClass::ClientProtected
        } else {
            AccessClass::Public
        };
        prop_assert_eq!(class, expected);
    }

    #[test]
    fn public_paths_are_always_allowed_without_credential(path in "/(about|pricing|api|client/signup)(/[a-z]{1,8}){0,3}") {
        prop_assert_eq!(decide(&path, false), GuardDecision::Allow);
    }

    #[test]
    fn decision_is_deterministic(path in "/[a-z/]{0,24}", has_credential in any::<bool>()) {
        prop_assert_eq!(decide(&path, has_credential), decide(&path, has_credential));
    }

    #[test]
    fn api_paths_bypass_the_guard(rest in "[a-z/]{0,24}") {
        let path = format!("/api/{rest}");
        prop_assert!(!guard_applies(&path));
    }
}

#[test]
fn login_page_redirects_only_authenticated_users() {
    assert_eq!(decide("/login", true), redirect("/coach/dashboard"));
    assert_eq!(decide("/login", false), GuardDecision::Allow);
}
