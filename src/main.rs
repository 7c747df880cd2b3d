use layer_cake::{
    flow,
    scene::{CakeFlow, SceneConfig},
};

fn main() -> anyhow::Result<()> {
    flow::run::<()>(vec![CakeFlow::constructor(SceneConfig::default())])
}
