fn main() -> anyhow::Result<()> {
    lc_labeler_lib::run()
}
