use std::sync::Arc;

use discomfort_sdk::DiscomfortApi;
use taste_graph_sdk::TasteGraphApi;
use text_gen::TextGenService;

/// What every handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<dyn TasteGraphApi>,
    pub text_gen: TextGenService,
    pub discomfort: Arc<dyn DiscomfortApi>,
}
