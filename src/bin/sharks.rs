use vr_aquarium::scene::{self, Stage};

fn main() -> anyhow::Result<()> {
    scene::run(Stage::Sharks)
}
