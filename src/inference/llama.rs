//! llama.cpp backend
//!
//! Loads GGUF files through `llama-cpp-2`. Each `generate` call builds its own
//! context, so one handle can serve concurrent requests without locking.

use crate::inference::engine::{
    find_stop, token_budget, Choice, FinishReason, GenerationParams, InferenceError, LoadParams,
    ModelBackend, TextGenerator,
};
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;

const PROMPT_BATCH_SIZE: usize = 512;

/// Process-wide llama.cpp backend
pub struct LlamaCppBackend {
    backend: Arc<LlamaBackend>,
}

impl LlamaCppBackend {
    /// Initialise llama.cpp. Only one backend may exist per process.
    pub fn init() -> Result<Self, InferenceError> {
        let mut backend = LlamaBackend::init()
            .map_err(|e| InferenceError::BackendUnavailable(e.to_string()))?;
        backend.void_logs();
        Ok(Self {
            backend: Arc::new(backend),
        })
    }
}

impl ModelBackend for LlamaCppBackend {
    fn name(&self) -> &str {
        "llama.cpp"
    }

    fn load(
        &self,
        path: &Path,
        params: &LoadParams,
    ) -> Result<Arc<dyn TextGenerator>, InferenceError> {
        let model_params = LlamaModelParams::default();
        let model = LlamaModel::load_from_file(&self.backend, path, &model_params)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        tracing::debug!(
            "GGUF loaded: {} (trained context {})",
            path.display(),
            model.n_ctx_train()
        );

        Ok(Arc::new(LlamaHandle {
            backend: Arc::clone(&self.backend),
            model,
            params: *params,
        }))
    }
}

/// A loaded GGUF model
pub struct LlamaHandle {
    backend: Arc<LlamaBackend>,
    model: LlamaModel,
    params: LoadParams,
}

impl LlamaHandle {
    fn sampler(&self, temperature: f32) -> LlamaSampler {
        if temperature <= 0.0 {
            return LlamaSampler::greedy();
        }
        let seed = chrono::Utc::now().timestamp_subsec_nanos();
        LlamaSampler::chain_simple([
            LlamaSampler::top_k(40),
            LlamaSampler::top_p(0.95, 1),
            LlamaSampler::temp(temperature),
            LlamaSampler::dist(seed),
        ])
    }
}

impl TextGenerator for LlamaHandle {
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<Choice>, InferenceError> {
        let n_ctx = self.params.context_size;
        let threads = self.params.threads as i32;
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(n_ctx))
            .with_n_threads(threads)
            .with_n_threads_batch(threads);
        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .map_err(|e| InferenceError::Context(e.to_string()))?;

        // AddBos maps to llama_tokenize's add_special: BOS is only prepended when the
        // GGUF vocab sets add_bos_token, which Qwen2 does not
        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(|e| InferenceError::Tokenize(e.to_string()))?;
        if tokens.len() >= n_ctx as usize {
            return Err(InferenceError::Generation(format!(
                "Requested tokens ({}) exceed context window of {}",
                tokens.len(),
                n_ctx
            )));
        }

        let mut batch = LlamaBatch::new(tokens.len().max(PROMPT_BATCH_SIZE), 1);
        let last_index = tokens.len() as i32 - 1;
        for (i, token) in (0_i32..).zip(tokens.iter()) {
            batch
                .add(*token, i, &[0], i == last_index)
                .map_err(|e| InferenceError::Decode(e.to_string()))?;
        }
        ctx.decode(&mut batch)
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        let mut sampler = self.sampler(params.temperature);
        let mut bytes: Vec<u8> = Vec::new();
        let mut n_cur = batch.n_tokens();
        let budget = token_budget(params.max_tokens, tokens.len(), n_ctx);
        let mut generated = 0u32;
        let mut finish_reason = FinishReason::Length;

        while generated < budget {
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            sampler.accept(token);

            if self.model.is_eog_token(token) {
                finish_reason = FinishReason::Stop;
                break;
            }

            let piece = self
                .model
                .token_to_bytes(token, Special::Tokenize)
                .map_err(|e| InferenceError::Generation(e.to_string()))?;
            bytes.extend_from_slice(&piece);
            generated += 1;

            if find_stop(&String::from_utf8_lossy(&bytes), &params.stop).is_some() {
                finish_reason = FinishReason::Stop;
                break;
            }

            batch.clear();
            batch
                .add(token, n_cur, &[0], true)
                .map_err(|e| InferenceError::Decode(e.to_string()))?;
            n_cur += 1;
            ctx.decode(&mut batch)
                .map_err(|e| InferenceError::Decode(e.to_string()))?;
        }

        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        if let Some(cut) = find_stop(&text, &params.stop) {
            text.truncate(cut);
        }

        tracing::debug!(
            "Generated {} tokens (finish: {:?})",
            generated,
            finish_reason
        );

        Ok(vec![Choice {
            text,
            finish_reason,
        }])
    }

    fn context_size(&self) -> u32 {
        self.params.context_size
    }
}
