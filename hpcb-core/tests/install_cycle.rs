// hpcb-core/tests/install_cycle.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hpcb_common::config::Config;
use hpcb_common::error::Result;
use hpcb_common::{
    DockerImage, FileArtifact, GitRepo, Installable, PythonExecutable, SchedulerKind, System, Test,
};
use hpcb_core::{CommandOutput, CommandRunner, Installer, InstallerContext, InstallerRegistry};
use tempfile::TempDir;

/// Stands in for git, python and the Slurm client tools.
#[derive(Debug, Default)]
struct ClusterSim {
    log: Mutex<Vec<String>>,
}

impl ClusterSim {
    fn ran(&self, prefix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

impl CommandRunner for ClusterSim {
    fn run(&self, program: &str, args: &[String], _cwd: Option<&Path>) -> Result<CommandOutput> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{program} {}", args.join(" ")));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let stdout = match (program, args.as_slice()) {
            ("git", ["clone", _, dest]) => {
                fs::create_dir_all(dest).unwrap();
                fs::write(Path::new(dest).join("requirements.txt"), "mpi4py\n").unwrap();
                ""
            }
            ("python3", ["-m", "venv", dest]) => {
                fs::create_dir_all(Path::new(dest).join("bin")).unwrap();
                ""
            }
            ("srun", ["--help"]) => {
                "--container-image --container-mounts --gpus-per-node --ntasks-per-node --mpi"
            }
            _ => "",
        };
        Ok(CommandOutput::succeeded(stdout))
    }

    fn find_binary(&self, name: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/opt/cluster/bin").join(name))
    }
}

fn benchmark_tests(src: &Path) -> Vec<Test> {
    let nccl = GitRepo::new("https://github.com/NVIDIA/nccl-tests.git", "c6afef0");
    let bench = PythonExecutable::new(GitRepo::new("https://github.com/org/bench.git", "9f1e2d"));
    vec![
        Test::new(
            "nccl_all_reduce",
            vec![
                Installable::DockerImage(DockerImage::new("nvcr.io/nvidia/pytorch:24.02-py3")),
                Installable::GitRepo(nccl.clone()),
            ],
        ),
        Test::new(
            "bench_train",
            vec![
                Installable::GitRepo(nccl),
                Installable::PythonExecutable(bench),
                Installable::File(FileArtifact::new(src)),
            ],
        ),
    ]
}

#[test]
fn slurm_install_verify_uninstall_cycle() {
    let tmp = TempDir::new().unwrap();
    let home = tmp.path().join("home");
    fs::create_dir_all(&home).unwrap();
    let src = tmp.path().join("env.sh");
    fs::write(&src, "export NCCL_DEBUG=INFO\n").unwrap();
    let root = tmp.path().join("hpcb");

    let sim = Arc::new(ClusterSim::default());
    let ctx = InstallerContext::new(Config::with_home(&home), sim.clone());
    let system = System::new("eos", SchedulerKind::Slurm, Some(root.clone()));
    let installer = Installer::new(&system, &InstallerRegistry::with_defaults(), &ctx).unwrap();
    let mut tests = benchmark_tests(&src);

    assert!(!installer.is_installed(&mut tests).unwrap().is_success());

    let res = installer.install(&mut tests).unwrap();
    assert!(res.is_success(), "{res}");
    assert_eq!(sim.ran("git clone"), 2);
    assert_eq!(sim.ran("python3 -m venv"), 1);
    assert!(home.join(".hpcb.toml").is_file());

    let Installable::GitRepo(shared) = &tests[1].installables()[0] else {
        panic!("expected git repo");
    };
    assert_eq!(shared.installed_path(), Some(root.join("nccl-tests").as_path()));
    let Installable::PythonExecutable(py) = &tests[1].installables()[1] else {
        panic!("expected python executable");
    };
    assert_eq!(py.venv_path(), Some(root.join("bench-venv").as_path()));

    assert!(installer.is_installed(&mut tests).unwrap().is_success());
    for item in tests.iter().flat_map(|t| t.installables()) {
        if !matches!(item, Installable::DockerImage(_)) {
            assert!(locations(item).0.is_some(), "{item} has no location");
        }
    }

    let res = installer.install(&mut tests).unwrap();
    assert!(res.is_success());
    assert_eq!(sim.ran("git clone"), 2);

    let res = installer.uninstall(&mut tests).unwrap();
    assert!(res.is_success(), "{res}");
    assert!(!root.exists());
    assert!(!home.join(".hpcb.toml").exists());
    assert!(src.exists());
    for item in tests.iter().flat_map(|t| t.installables()) {
        assert_eq!(locations(item), (None, None), "{item} kept a location");
    }

    assert!(!installer.is_installed(&mut tests).unwrap().is_success());
}

/// The installed path and venv path an installable currently reports.
fn locations(item: &Installable) -> (Option<&Path>, Option<&Path>) {
    match item {
        Installable::DockerImage(_) => (None, None),
        Installable::GitRepo(repo) => (repo.installed_path(), None),
        Installable::File(file) => (file.installed_path(), None),
        Installable::PythonExecutable(py) => (py.git_repo.installed_path(), py.venv_path()),
    }
}

#[test]
fn lsf_adopts_prestaged_artifacts() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("staged");
    fs::create_dir_all(root.join("nccl-tests")).unwrap();

    let ctx = InstallerContext::new(Config::with_home(tmp.path()), Arc::new(ClusterSim::default()));
    let system = System::new("summit", SchedulerKind::Lsf, Some(root.clone()));
    let installer = Installer::new(&system, &InstallerRegistry::with_defaults(), &ctx).unwrap();

    let mut tests = vec![Test::new(
        "nccl_all_reduce",
        vec![Installable::GitRepo(GitRepo::new(
            "https://github.com/NVIDIA/nccl-tests.git",
            "c6afef0",
        ))],
    )];
    assert!(installer.mark_as_installed(&mut tests).unwrap().is_success());
    let Installable::GitRepo(repo) = &tests[0].installables()[0] else {
        panic!("expected git repo");
    };
    assert_eq!(repo.installed_path(), Some(root.join("nccl-tests").as_path()));
    assert!(installer.is_installed(&mut tests).unwrap().is_success());
}
