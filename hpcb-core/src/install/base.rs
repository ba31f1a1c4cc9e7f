// hpcb-core/src/install/base.rs
//! Scheduler-independent orchestration shared by every installer.

use std::collections::HashMap;

use hpcb_common::{InstallStatusResult, Installable, InstallableKey, Test};
use tracing::{debug, error, info};

use super::InstallerBackend;
use crate::check::prerequisites::{check_binaries, BASE_PREREQUISITES};
use crate::runner::CommandRunner;

/// Checks the binaries every installer needs (a git client).
pub fn check_base_prerequisites(runner: &dyn CommandRunner) -> InstallStatusResult {
    check_binaries(runner, BASE_PREREQUISITES)
}

/// Applies `op` once per distinct installable across `tests`, stopping at the
/// first failure. Duplicates (same identity key) are not visited; they receive
/// the location fields of the first occurrence instead.
///
/// Returns the number of distinct installables visited.
pub(crate) fn for_each_unique<F>(tests: &mut [Test], mut op: F) -> Result<usize, InstallStatusResult>
where
    F: FnMut(&mut Installable) -> InstallStatusResult,
{
    let mut resolved: HashMap<InstallableKey, Installable> = HashMap::new();
    for test in tests.iter_mut() {
        debug!(
            "{} has {} installables.",
            test.name,
            test.installables().len()
        );
        for item in test.installables_mut() {
            let key = item.key();
            if let Some(first) = resolved.get(&key) {
                item.adopt_locations(first);
                continue;
            }
            let res = op(item);
            if !res.is_success() {
                return Err(res);
            }
            resolved.insert(key, item.clone());
        }
    }
    Ok(resolved.len())
}

pub fn is_installed<B: InstallerBackend + ?Sized>(
    backend: &B,
    tests: &mut [Test],
) -> InstallStatusResult {
    let prerequisites = backend.check_prerequisites();
    if !prerequisites.is_success() {
        return prerequisites;
    }
    is_installed_items(backend, tests)
}

/// Verifies every distinct installable, failing fast on the first missing one.
pub fn is_installed_items<B: InstallerBackend + ?Sized>(
    backend: &B,
    tests: &mut [Test],
) -> InstallStatusResult {
    match for_each_unique(tests, |item| backend.is_installed_one(item)) {
        Ok(count) => InstallStatusResult::ok_with(format!("All {count} installables are installed.")),
        Err(res) => res,
    }
}

pub fn install<B: InstallerBackend + ?Sized>(
    backend: &B,
    tests: &mut [Test],
) -> InstallStatusResult {
    let prerequisites = backend.check_prerequisites();
    if !prerequisites.is_success() {
        return prerequisites;
    }
    install_items(backend, tests)
}

/// Installs every distinct installable that is not already present, aborting
/// at the first failure.
pub fn install_items<B: InstallerBackend + ?Sized>(
    backend: &B,
    tests: &mut [Test],
) -> InstallStatusResult {
    let outcome = for_each_unique(tests, |item| {
        let status = backend.is_installed_one(item);
        if status.is_success() {
            info!("{} is already installed, skipping.", item);
            return status;
        }
        debug!("{} is not installed: {}", item, status.message());

        let res = backend.install_one(item);
        if res.is_success() {
            info!("Installed {}", item);
        } else {
            error!("Failed to install {}: {}", item, res.message());
        }
        res
    });

    match outcome {
        Ok(count) => InstallStatusResult::ok_with(format!("{count} installables are installed.")),
        Err(res) => res,
    }
}

/// Removes every distinct installable. Absent artifacts count as removed.
pub fn uninstall<B: InstallerBackend + ?Sized>(
    backend: &B,
    tests: &mut [Test],
) -> InstallStatusResult {
    let outcome = for_each_unique(tests, |item| {
        let res = backend.uninstall_one(item);
        if res.is_success() {
            debug!("Uninstalled {}: {}", item, res.message());
        } else {
            error!("Failed to uninstall {}: {}", item, res.message());
        }
        res
    });

    match outcome {
        Ok(_) => InstallStatusResult::ok_with("All installables uninstalled successfully."),
        Err(res) => res,
    }
}

pub fn mark_as_installed<B: InstallerBackend + ?Sized>(
    backend: &B,
    tests: &mut [Test],
) -> InstallStatusResult {
    match for_each_unique(tests, |item| backend.mark_as_installed_one(item)) {
        Ok(count) => InstallStatusResult::ok_with(format!("{count} installables marked as installed.")),
        Err(res) => res,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use hpcb_common::{DockerImage, GitRepo};

    use super::*;

    /// Backend that records which keys it was asked about.
    #[derive(Default)]
    struct Recorder {
        prerequisites_ok: bool,
        installed: RefCell<Vec<InstallableKey>>,
        fail_on: Option<InstallableKey>,
        seen: RefCell<Vec<String>>,
    }

    impl InstallerBackend for Recorder {
        fn check_prerequisites(&self) -> InstallStatusResult {
            if self.prerequisites_ok {
                InstallStatusResult::ok()
            } else {
                InstallStatusResult::failed("Required binary 'git' is not installed.")
            }
        }

        fn install_one(&self, item: &mut Installable) -> InstallStatusResult {
            self.seen.borrow_mut().push(format!("install {item}"));
            if self.fail_on.as_ref() == Some(&item.key()) {
                return InstallStatusResult::failed(format!("cannot install {item}"));
            }
            if let Installable::GitRepo(repo) = item {
                repo.set_installed_path(format!("/root/{}", repo.repo_name()).into());
            }
            self.installed.borrow_mut().push(item.key());
            InstallStatusResult::ok()
        }

        fn uninstall_one(&self, item: &mut Installable) -> InstallStatusResult {
            self.seen.borrow_mut().push(format!("uninstall {item}"));
            InstallStatusResult::ok_with(format!("{item} is not installed."))
        }

        fn is_installed_one(&self, item: &mut Installable) -> InstallStatusResult {
            self.seen.borrow_mut().push(format!("check {item}"));
            if self.installed.borrow().contains(&item.key()) {
                InstallStatusResult::ok()
            } else {
                InstallStatusResult::failed(format!("{item} missing"))
            }
        }

        fn mark_as_installed_one(&self, item: &mut Installable) -> InstallStatusResult {
            self.seen.borrow_mut().push(format!("mark {item}"));
            InstallStatusResult::ok()
        }
    }

    fn tests_with_shared_repo() -> Vec<Test> {
        let repo = || Installable::GitRepo(GitRepo::new("https://example/repo.git", "abc123"));
        vec![
            Test::new("nccl", vec![repo(), Installable::DockerImage(DockerImage::new("img:1"))]),
            Test::new("ucc", vec![repo()]),
        ]
    }

    #[test]
    fn install_visits_duplicates_once_and_shares_locations() {
        let backend = Recorder {
            prerequisites_ok: true,
            ..Default::default()
        };
        let mut tests = tests_with_shared_repo();

        let res = install(&backend, &mut tests);
        assert!(res.is_success(), "{res}");
        let installs = backend
            .seen
            .borrow()
            .iter()
            .filter(|s| s.starts_with("install"))
            .count();
        assert_eq!(installs, 2);

        let Installable::GitRepo(dup) = &tests[1].installables()[0] else {
            panic!("expected git repo");
        };
        assert_eq!(dup.installed_path(), Some(std::path::Path::new("/root/repo")));
    }

    #[test]
    fn install_aborts_on_prerequisites_before_any_item() {
        let backend = Recorder::default();
        let mut tests = tests_with_shared_repo();
        let res = install(&backend, &mut tests);
        assert!(!res.is_success());
        assert!(backend.seen.borrow().is_empty());

        let res = is_installed(&backend, &mut tests);
        assert_eq!(res.message(), "Required binary 'git' is not installed.");
        assert!(backend.seen.borrow().is_empty());
    }

    #[test]
    fn install_stops_at_first_failure() {
        let backend = Recorder {
            prerequisites_ok: true,
            fail_on: Some(InstallableKey::GitRepo {
                url: "https://example/repo.git".to_string(),
                commit: "abc123".to_string(),
            }),
            ..Default::default()
        };
        let mut tests = tests_with_shared_repo();
        let res = install(&backend, &mut tests);
        assert!(!res.is_success());
        assert!(res.message().starts_with("cannot install GitRepo"));
        assert!(!backend.seen.borrow().iter().any(|s| s.contains("DockerImage")));
    }

    #[test]
    fn is_installed_fails_fast_with_item_message() {
        let backend = Recorder {
            prerequisites_ok: true,
            ..Default::default()
        };
        let mut tests = tests_with_shared_repo();
        let res = is_installed(&backend, &mut tests);
        assert_eq!(
            res.message(),
            "GitRepo(url=https://example/repo.git, commit=abc123) missing"
        );
        assert_eq!(backend.seen.borrow().len(), 1);
    }

    #[test]
    fn uninstall_of_absent_items_succeeds() {
        let backend = Recorder::default();
        let mut tests = tests_with_shared_repo();
        let res = uninstall(&backend, &mut tests);
        assert!(res.is_success());
        assert_eq!(backend.seen.borrow().len(), 2);
    }

    #[test]
    fn empty_test_list_is_installed() {
        let backend = Recorder {
            prerequisites_ok: true,
            ..Default::default()
        };
        let res = is_installed(&backend, &mut []);
        assert!(res.is_success());
        assert_eq!(res.message(), "All 0 installables are installed.");
    }
}
