//! Embeds the release version into the binary.
use std::process::Command;

fn main() {
    // POSTINSTALL_VERSION wins when set by a release build; local builds fall
    // back to git describe.
    if let Ok(version) = std::env::var("POSTINSTALL_VERSION") {
        println!("cargo:rustc-env=POSTINSTALL_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=POSTINSTALL_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-env-changed=POSTINSTALL_VERSION");
}
