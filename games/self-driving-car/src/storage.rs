//! Picks where the best brain lives: a JSON file natively, the local storage in the browser.
//!
//! For the browser the HTML page has to load `storage.js` next to `sapp_jsutils.js`, which
//! provides the three `brain_storage_*` functions imported below.

use simulation::brain_store::BrainStore;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use sapp_jsutils::JsObject;
    use simulation::brain_store::{BRAIN_KEY, BrainStore};
    use simulation::error::SimResult;
    use simulation::network::NeuralNetwork;

    unsafe extern "C" {
        fn brain_storage_load(key: JsObject) -> JsObject;
        fn brain_storage_save(key: JsObject, value: JsObject);
        fn brain_storage_remove(key: JsObject);
    }

    /// Stores the brain under [`BRAIN_KEY`] in `window.localStorage`.
    pub struct LocalStorageBrainStore;

    impl BrainStore for LocalStorageBrainStore {
        fn load(&mut self) -> SimResult<Option<NeuralNetwork>> {
            let mut json = String::new();
            unsafe {
                brain_storage_load(JsObject::string(BRAIN_KEY)).to_string(&mut json);
            }
            // The plugin answers with an empty string for a missing entry.
            if json.is_empty() {
                return Ok(None);
            }
            NeuralNetwork::from_json(&json).map(Some)
        }

        fn save(&mut self, brain: &NeuralNetwork) -> SimResult<()> {
            let json = brain.to_json()?;
            unsafe {
                brain_storage_save(JsObject::string(BRAIN_KEY), JsObject::string(&json));
            }
            tracing::info!("Saved best brain to local storage.");
            Ok(())
        }

        fn discard(&mut self) -> SimResult<()> {
            unsafe {
                brain_storage_remove(JsObject::string(BRAIN_KEY));
            }
            Ok(())
        }
    }
}

/// The store matching the platform we run on.
#[cfg(target_arch = "wasm32")]
pub fn platform_store() -> Box<dyn BrainStore> {
    Box::new(local_storage::LocalStorageBrainStore)
}

/// The store matching the platform we run on.
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_store() -> Box<dyn BrainStore> {
    Box::new(simulation::brain_store::FileBrainStore::in_working_dir())
}
