fn main() -> anyhow::Result<()> {
    kifu::cli::run()
}
