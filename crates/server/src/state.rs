use std::sync::Arc;

use models::agency::Agency;
use models::blog::BlogPost;
use models::package::Package;
use service::auth::repo::store::StoreAuthRepository;
use service::auth::service::AuthConfig;
use service::auth::AuthService;
use service::services::{HeroSlideService, RecordService, SettingsService, UserService};
use service::storage::RecordStore;

pub type Auth = AuthService<StoreAuthRepository>;

/// Services shared by every handler; all of them sit on one record store.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<Auth>,
    pub packages: Arc<RecordService<Package>>,
    pub agencies: Arc<RecordService<Agency>>,
    pub blog: Arc<RecordService<BlogPost>>,
    pub hero_slides: Arc<HeroSlideService>,
    pub settings: Arc<SettingsService>,
    pub users: Arc<UserService>,
}

impl ServerState {
    pub fn new(store: &Arc<RecordStore>, auth: AuthConfig) -> Self {
        let repo = Arc::new(StoreAuthRepository::new(store));
        Self {
            auth: Arc::new(AuthService::new(repo, auth)),
            packages: Arc::new(RecordService::new(store.clone())),
            agencies: Arc::new(RecordService::new(store.clone())),
            blog: Arc::new(RecordService::new(store.clone())),
            hero_slides: Arc::new(HeroSlideService::new(store)),
            settings: Arc::new(SettingsService::new(store)),
            users: Arc::new(UserService::new(store)),
        }
    }
}
