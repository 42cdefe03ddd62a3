//! Integration tests for install runs against the in-memory fakes.
mod common;

use common::{Harness, backups_of, read, repo_assets, tree};
use postinstall_cli::components::usage_table;
use postinstall_cli::error::{PostinstallError, PreflightError};
use postinstall_cli::logging::ComponentStatus;

const EVERYTHING: &[&str] = &[
    "tools",
    "boot-theme",
    "prompt",
    "keyboard",
    "window-manager",
    "autotiling",
    "ssh-key",
    "kernel",
];

fn sway_asset() -> String {
    read(&repo_assets().join("sway/config"))
}

#[test]
fn usage_lists_components_in_registry_order() {
    insta::assert_snapshot!(usage_table(), @r"
    Components:
      tools           command-line tools (aliases: cli-tools, cli)
      boot-theme      Plymouth boot splash theme (aliases: plymouth, theme)
      prompt          Starship shell prompt (aliases: starship)
      keyboard        keyd key remapping (aliases: keyd, remap)
      window-manager  sway window manager configuration (aliases: wm, sway)
      autotiling      autotiling helper for sway (aliases: tiling)
      ssh-key         ed25519 SSH key pair (aliases: ssh)
      kernel          alternate kernel as the default boot entry (aliases: alt-kernel, zen)
    ");
}

#[test]
fn install_everything_twice_converges() {
    let h = Harness::new();

    h.run(EVERYTHING).expect("first install");
    let after_first = tree(h.root.path());
    h.run(EVERYTHING).expect("second install");

    assert_eq!(tree(h.root.path()), after_first);
    let statuses = h.statuses();
    assert_eq!(statuses.len(), 2 * EVERYTHING.len());
    assert!(
        statuses[..EVERYTHING.len()]
            .iter()
            .all(|(_, status)| *status == ComponentStatus::Ok),
        "first run: {statuses:?}"
    );
    assert!(
        statuses[EVERYTHING.len()..]
            .iter()
            .all(|(_, status)| *status == ComponentStatus::Skipped),
        "second run: {statuses:?}"
    );
    assert_eq!(h.bootloader.regenerations(), 1);
}

#[test]
fn install_reaches_every_target() {
    let h = Harness::new();

    h.run(EVERYTHING).expect("install");

    assert!(h.packages.is("git") && h.packages.is("ripgrep"));
    assert!(h.packages.is("plymouth") && h.packages.is("keyd") && h.packages.is("linux-zen"));
    assert_eq!(h.services.state("keyd"), (true, true));
    assert_eq!(h.executor.theme(), "minimal");
    assert!(h.path("usr/share/plymouth/themes/minimal/minimal.script").is_file());
    assert_eq!(
        read(&h.path("etc/keyd/default.conf")),
        read(&repo_assets().join("keyd/default.conf"))
    );
    assert_eq!(read(&h.path("home/.config/sway/config")), sway_asset());
    assert!(read(&h.path("home/.config/sway/config.d/autotiling")).contains("exec_always autotiling"));
    assert!(read(&h.path("home/.ssh/id_ed25519.pub")).contains("tester@sandbox"));
    assert!(read(&h.path("etc/default/grub")).contains("GRUB_DEFAULT=\"1>1\""));
}

#[test]
fn environment_is_written_and_sourced_once() {
    let h = Harness::new();

    h.run(&["tools", "prompt"]).expect("install");
    h.run(&["prompt"]).expect("install again");

    let script = read(&h.path("home/.config/postinstall/env.sh"));
    assert!(script.contains("$HOME/.local/bin"), "{script}");
    assert!(script.contains("STARSHIP_CONFIG"), "{script}");
    assert!(script.contains("starship init bash"), "{script}");
    let rc = read(&h.path("home/.bashrc"));
    assert_eq!(rc.matches("postinstall/env.sh").count(), 1, "{rc}");
}

#[test]
fn missing_privilege_stops_before_any_change() {
    let mut h = Harness::new();
    h.preflight.privilege = false;
    let before = tree(h.root.path());

    let err = h.run(&["window-manager", "keyboard"]).unwrap_err();

    assert!(matches!(err, PostinstallError::Preflight(PreflightError::NoPrivilege)));
    assert_eq!(tree(h.root.path()), before);
    assert!(!h.packages.is("keyd"));
    assert!(h.statuses().is_empty());
}

#[test]
fn offline_install_stops_before_any_change() {
    let mut h = Harness::new();
    h.preflight.network = false;
    let before = tree(h.root.path());

    let err = h.run(&["kernel"]).unwrap_err();

    assert!(matches!(err, PostinstallError::Preflight(PreflightError::NoNetwork { .. })));
    assert_eq!(tree(h.root.path()), before);
    assert_eq!(h.bootloader.regenerations(), 0);
}

#[test]
fn config_only_component_needs_no_preflight() {
    let h = Harness::new();

    h.run(&["wm"]).expect("install");

    assert_eq!(h.preflight.probes(), 0);
}

#[test]
fn absent_target_is_created_without_backup() {
    let h = Harness::new();
    let target = h.path("home/.config/sway/config");

    h.run(&["wm"]).expect("install");

    assert_eq!(read(&target), sway_asset());
    assert!(backups_of(&target).is_empty());
}

#[test]
fn identical_target_is_left_untouched() {
    let h = Harness::new();
    let target = h.path("home/.config/sway/config");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, sway_asset()).unwrap();
    let before = std::fs::read(&target).unwrap();

    h.run(&["wm"]).expect("install");

    assert_eq!(std::fs::read(&target).unwrap(), before);
    assert!(backups_of(&target).is_empty());
    assert_eq!(h.statuses(), vec![("window-manager".to_string(), ComponentStatus::Skipped)]);
}

#[test]
fn differing_target_is_backed_up_once_then_restored() {
    let h = Harness::new();
    let target = h.path("home/.config/sway/config");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, "OLD").unwrap();

    h.run(&["wm"]).expect("install");

    let backups = backups_of(&target);
    assert_eq!(backups.len(), 1);
    assert_eq!(read(&backups[0]), "OLD");
    assert_eq!(read(&target), sway_asset());

    h.run(&["uninstall", "wm"]).expect("uninstall");

    assert_eq!(read(&target), "OLD");
    assert_eq!(backups_of(&target).len(), 1);
}

#[test]
fn first_failure_stops_the_run() {
    let h = Harness::new();
    h.packages.break_package("keyd");

    let err = h.run(&["prompt", "keyboard", "wm"]).unwrap_err();

    let PostinstallError::Step(failure) = err else {
        panic!("expected a step failure, got {err:?}");
    };
    assert_eq!(failure.component, "keyboard");
    assert_eq!(
        h.statuses(),
        vec![
            ("prompt".to_string(), ComponentStatus::Ok),
            ("keyboard".to_string(), ComponentStatus::Failed),
            ("window-manager".to_string(), ComponentStatus::NotRun),
        ]
    );
    assert!(!h.path("home/.config/sway/config").exists());
    assert!(!h.path("home/.config/postinstall/env.sh").exists());
}

#[test]
fn dry_run_changes_nothing() {
    let h = Harness::new();
    let before = tree(h.root.path());

    h.dry_run(EVERYTHING).expect("dry run");

    assert_eq!(tree(h.root.path()), before);
    assert!(!h.packages.is("git"));
    assert_eq!(h.executor.theme(), "spinner");
    assert_eq!(h.bootloader.regenerations(), 0);
    assert!(
        h.statuses()
            .iter()
            .all(|(_, status)| *status == ComponentStatus::DryRun),
        "{:?}",
        h.statuses()
    );
}

#[test]
fn unknown_component_is_rejected_before_running() {
    let h = Harness::new();

    let err = h.run(&["tools", "emacs"]).unwrap_err();

    assert_eq!(err.to_string(), "unknown component 'emacs'");
    assert!(err.shows_usage());
    assert!(h.statuses().is_empty());
}
