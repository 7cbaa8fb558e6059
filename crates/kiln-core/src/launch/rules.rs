use crate::{
    platform::{OsName, ARCH},
    repository::manifest::{Action, Library, OsRule, Rule},
};

/// Decides whether a library guarded by `rules` applies on `os`.
///
/// An absent or empty rule list always applies. Otherwise the decision starts
/// as disallow and every rule is applied in order: a rule without `os` always
/// overrides the running decision, a rule with `os` only when the platform
/// matches it.
pub fn is_included(rules: Option<&[Rule]>, os: OsName) -> bool {
    is_included_on(rules, os, ARCH)
}

/// Like [`is_included`] for a process running on `arch`.
pub fn is_included_on(rules: Option<&[Rule]>, os: OsName, arch: &str) -> bool {
    let Some(rules) = rules.filter(|rules| !rules.is_empty()) else {
        return true;
    };

    let action = rules.iter().fold(Action::Disallow, |action, rule| match &rule.os {
        None => rule.action,
        Some(target) if os_matches(target, os, arch) => rule.action,
        Some(_) => action,
    });

    action == Action::Allow
}

/// Every field present in `target` must match. An empty `os` matches nothing.
fn os_matches(target: &OsRule, os: OsName, arch: &str) -> bool {
    if target.name.is_none() && target.arch.is_none() {
        return false;
    }

    let name = target.name.as_deref().map_or(true, |name| name == os.as_str());
    let arch = target.arch.as_deref().map_or(true, |wanted| wanted == arch);

    name && arch
}

pub fn is_library_included(library: &Library, os: OsName) -> bool {
    is_included(library.rules.as_deref(), os)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(action: Action, os: Option<&str>) -> Rule {
        Rule {
            action,
            os: os.map(|name| OsRule {
                name: Some(name.to_owned()),
                arch: None,
            }),
        }
    }

    #[test]
    fn no_rules_include() {
        for os in OsName::ALL {
            assert!(is_included(None, os));
            assert!(is_included(Some(&[]), os));
        }
    }

    #[test]
    fn unconditional_disallow_excludes() {
        let rules = [rule(Action::Disallow, None)];
        for os in OsName::ALL {
            assert!(!is_included(Some(&rules), os));
        }
    }

    #[test]
    fn os_scoped_allow() {
        let rules = [rule(Action::Disallow, None), rule(Action::Allow, Some("windows"))];

        assert!(is_included(Some(&rules), OsName::Windows));
        assert!(!is_included(Some(&rules), OsName::Linux));
        assert!(!is_included(Some(&rules), OsName::Osx));
    }

    #[test]
    fn last_match_wins() {
        let rules = [rule(Action::Allow, None), rule(Action::Disallow, Some("osx"))];

        assert!(is_included(Some(&rules), OsName::Linux));
        assert!(!is_included(Some(&rules), OsName::Osx));
    }

    #[test]
    fn only_os_rules_start_disallowed() {
        let rules = [rule(Action::Allow, Some("linux"))];

        assert!(is_included(Some(&rules), OsName::Linux));
        assert!(!is_included(Some(&rules), OsName::Windows));
    }

    fn arch_rule(action: Action, name: Option<&str>, arch: &str) -> Rule {
        Rule {
            action,
            os: Some(OsRule {
                name: name.map(str::to_owned),
                arch: Some(arch.to_owned()),
            }),
        }
    }

    #[test]
    fn arch_rule_only_matches_its_arch() {
        let rules = [rule(Action::Allow, None), arch_rule(Action::Disallow, None, "x86")];

        for os in OsName::ALL {
            assert!(is_included_on(Some(&rules), os, "x86_64"));
            assert!(!is_included_on(Some(&rules), os, "x86"));
        }
    }

    #[test]
    fn name_and_arch_must_both_match() {
        let rules = [arch_rule(Action::Allow, Some("windows"), "x86")];

        assert!(is_included_on(Some(&rules), OsName::Windows, "x86"));
        assert!(!is_included_on(Some(&rules), OsName::Windows, "x86_64"));
        assert!(!is_included_on(Some(&rules), OsName::Linux, "x86"));
    }

    #[test]
    fn empty_os_never_matches() {
        let rules = [
            rule(Action::Allow, None),
            Rule {
                action: Action::Disallow,
                os: Some(OsRule::default()),
            },
        ];

        for os in OsName::ALL {
            assert!(is_included(Some(&rules), os));
        }
    }
}
