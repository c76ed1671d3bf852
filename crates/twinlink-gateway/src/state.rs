use crate::auth::TokenIssuer;
use std::sync::Arc;
use twinlink_coordinator::LinkService;
use twinlink_core::Alias;
use twinlink_generator::Generator;

#[derive(Clone)]
pub struct AppState {
    service: Arc<dyn LinkService>,
    tokens: Arc<TokenIssuer>,
    generator: Arc<dyn Generator<Output = Alias>>,
}

impl AppState {
    pub fn new(
        service: Arc<dyn LinkService>,
        tokens: TokenIssuer,
        generator: Arc<dyn Generator<Output = Alias>>,
    ) -> Self {
        Self {
            service,
            tokens: Arc::new(tokens),
            generator,
        }
    }

    pub fn service(&self) -> &dyn LinkService {
        self.service.as_ref()
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn generate_alias(&self) -> Alias {
        self.generator.generate()
    }
}
