fn main() -> anyhow::Result<()> {
    webexdl_lib::run()
}
