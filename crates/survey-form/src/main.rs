fn main() -> anyhow::Result<()> {
    survey_form::cli::main()
}
