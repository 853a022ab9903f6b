fn main() {
    votemap::cli::run();
}
