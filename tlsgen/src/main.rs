use anyhow::Result;
use clap::Parser;
use keyprov::{KeyProvisioner, Opt, ProcessKeyTool, UdpProbe};

fn main() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or(tracing_subscriber::EnvFilter::new("info")),
            )
            .finish(),
    )
    .unwrap();

    let opt = Opt::parse();
    let code = {
        if let Err(e) = run(opt) {
            eprintln!("ERROR: {e}");
            1
        } else {
            0
        }
    };
    ::std::process::exit(code);
}

fn run(opt: Opt) -> Result<()> {
    let keytool = ProcessKeyTool::new(&opt.keytool, &opt.java);
    let provisioner = KeyProvisioner::new(keytool, UdpProbe::default(), opt.config());

    let provisioned = provisioner.run(&opt.secret(), &opt.host)?;
    for warning in &provisioned.warnings {
        eprintln!("/!\\ {warning}");
    }
    println!("{}", provisioned.guidance());

    Ok(())
}
