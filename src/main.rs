fn main() {
    neon_range::game::run();
}
