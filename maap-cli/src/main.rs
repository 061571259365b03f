fn main() -> anyhow::Result<()> {
    maap_cli::run()
}
