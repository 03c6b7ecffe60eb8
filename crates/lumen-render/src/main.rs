use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use lumen_engine::device::{
    select_device, select_platform, write_capabilities, write_device_list, write_platform_list,
    ContextInit, DeviceCatalog, SelectedDevice,
};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::scene::reference_scene;
use lumen_engine::{RenderConfig, RenderSession};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("render failed: {err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let init = ContextInit::default();
    let config = RenderConfig::default();

    let selected = {
        let mut input = io::stdin().lock();
        let mut out = io::stdout().lock();
        choose_device(&init, &mut input, &mut out)?
    };

    let session = RenderSession::open(selected, &init, config)
        .context("could not prepare the render kernel")?;

    let scene = reference_scene();
    let frame = session
        .render_to_file(&scene)
        .context("render did not complete")?;

    println!(
        "Saved {}x{} image to '{}'",
        frame.width(),
        frame.height(),
        session.config().output_path.display()
    );
    Ok(())
}

/// Lists platforms and devices, lets the user pick one of each, and claims
/// the chosen device. Single candidates are picked without prompting.
fn choose_device<R: BufRead, W: Write>(
    init: &ContextInit,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<SelectedDevice> {
    let catalog = DeviceCatalog::enumerate(init);

    let platforms = catalog.platforms()?;
    write_platform_list(out, &platforms)?;
    let platform = select_platform(&platforms, input, out)?;
    writeln!(out, "\nUsing platform: {platform}\n")?;
    log::info!("platform: {platform}");

    let devices = catalog.devices(platform)?;
    write_device_list(out, &devices)?;
    let device = select_device(&devices, input, out)?;
    writeln!(out, "\nUsing device: {}", device.info().name)?;
    write_capabilities(out, device.info(), "\t")?;
    writeln!(out)?;
    out.flush()?;
    log::info!("device: {}", device.info());

    let id = device.id();
    Ok(catalog.claim(id)?)
}
