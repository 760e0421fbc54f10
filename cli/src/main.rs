fn main() -> anyhow::Result<()> {
    quadstore_cli::run()
}
