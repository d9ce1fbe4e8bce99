fn main() -> anyhow::Result<()> {
    routegate::cli::run_cli()
}
