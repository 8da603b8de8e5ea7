use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("glean")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Glean Contributors")
        .about("Extract clean article records from web pages")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(--"base-url" <URL> "Page URL for file or stdin input").value_name("URL"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, text, markdown)")
                .value_name("FORMAT")
                .default_value("json")
                .value_parser(["json", "text", "markdown"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("15"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(--"min-content" <CHARS> "Minimum body length in characters before the record is rejected")
                .default_value("100"),
        )
        .arg(clap::arg!(--"allow-short" "Emit the record even when the body is shorter than --min-content"))
        .arg(clap::arg!(--gallery <NUM> "Number of images listed in text and markdown output").default_value("6"))
        .arg(clap::arg!(--sequential "Run the two extraction strategies one after the other"))
        .arg(clap::arg!(-v --verbose "Enable debug logging, field sources and timings"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "glean", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "glean", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "glean", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "glean", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
