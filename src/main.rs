fn main() -> Result<(), Box<dyn std::error::Error>> {
    quickgpt::cli::main()
}
