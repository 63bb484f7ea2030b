use duct::cmd;

use crate::Frontend;

/// Builds a binary for UEFI with the allocator and panic handler, and runs it with uefi-run.
pub fn run_in_vm(
    bin: &str,
    ovmf_code: Option<&str>,
    release: bool,
    add_file: Option<&str>,
) -> anyhow::Result<()> {
    let mut run_args = vec!["-d".to_owned()];
    let mut build_args = vec![
        "build",
        "--bin",
        bin,
        "--target",
        "x86_64-unknown-uefi",
        "--features",
        "global_allocator,panic_handler",
    ];

    if let Some(ovmf_code) = ovmf_code {
        run_args.extend(["-b".to_owned(), ovmf_code.to_owned()]);
    }

    if let Some(add_file) = add_file {
        run_args.extend(["-f".to_owned(), add_file.to_owned()]);
    }

    let profile = if release {
        build_args.extend(["--profile", "release-lto"]);
        "release-lto"
    } else {
        "debug"
    };
    run_args.push(format!("target/x86_64-unknown-uefi/{profile}/{bin}.efi"));

    cmd!("cargo", "install", "uefi-run").run()?; // will not install if its already installed
    cmd("cargo", build_args).run()?;
    if let Err(e) = cmd("uefi-run", run_args).run() {
        println!(
            "hint: if the error was that the PC BIOS could not be loaded, you may have to specify ovmf-code"
        );
        return Err(e.into());
    }
    Ok(())
}

pub fn run_frontend(
    frontend: Frontend,
    ovmf_code: Option<&str>,
    release: bool,
    add_file: Option<&str>,
) -> anyhow::Result<()> {
    run_in_vm(frontend.bin(), ovmf_code, release, add_file)
}
