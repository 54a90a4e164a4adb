use std::env;
use std::path::{Path, PathBuf};
use std::sync::Once;

use diesel::{delete, insert_into, Connection, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use log::{debug, trace};
use pokemon_manager::db::{
    get_db_url, get_pool, get_test_db_url, Pool, PooledConnection, SyncConnection,
};
use pokemon_manager::helpers::env::load_optional_dotenv;
use pokemon_manager::models::pokemon::{CreatePokemon, Pokemon};
use pokemon_manager::schema::pokemon;
use pokemon_manager::storage::ImageStorage;
use tempfile::TempDir;

#[macro_export]
macro_rules! init_test_service {
    ($app_var:ident, $service_var:ident) => {
        let $app_var = $crate::integration_helpers::app::TestApp::new();
        let $service_var = actix_web::test::init_service(pokemon_manager::pokemon_app!(
            $app_var.get_pool(),
            $app_var.get_storage()
        ))
        .await;
    };
}

pub struct TestApp {
    pool: Pool,
    storage: ImageStorage,
    public_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        static INIT_TEST_DB_ENV_VAR: Once = Once::new();
        INIT_TEST_DB_ENV_VAR.call_once(|| {
            debug!("Loading environment variables");
            load_optional_dotenv().unwrap();

            debug!("Setting environment variable required to connect to test DB");
            let db_url = get_test_db_url(&get_db_url().unwrap());
            env::set_var("DATABASE_URL", db_url);
        });

        debug!("Creating test database connection pool");
        let pool = get_pool().unwrap();

        debug!("Creating temporary public directory");
        let public_dir = TempDir::new().unwrap();
        let storage = ImageStorage::new(public_dir.path()).unwrap();

        Self { pool, storage, public_dir }
    }

    pub fn get_pool(&self) -> Pool {
        self.pool.clone()
    }

    pub fn get_storage(&self) -> ImageStorage {
        self.storage.clone()
    }

    pub fn public_dir(&self) -> &Path {
        self.public_dir.path()
    }

    pub fn stored_images(&self) -> Vec<PathBuf> {
        let mut images: Vec<_> = std::fs::read_dir(self.storage.images_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        images.sort();
        images
    }

    pub async fn get_pooled_connection(&self) -> PooledConnection {
        self.pool.get().await.unwrap()
    }

    pub async fn insert_pokemon(&self, new_pokemon: &CreatePokemon) -> Pokemon {
        let mut connection = self.get_pooled_connection().await;

        insert_into(pokemon::table)
            .values(new_pokemon)
            .returning(Pokemon::as_returning())
            .get_result(&mut connection)
            .await
            .unwrap()
    }

    pub async fn find_pokemon(&self, pokemon_id: i64) -> Option<Pokemon> {
        let mut connection = self.get_pooled_connection().await;

        pokemon::table
            .find(pokemon_id)
            .select(Pokemon::as_select())
            .first(&mut connection)
            .await
            .optional()
            .unwrap()
    }

    pub async fn list_pokemon(&self) -> Vec<Pokemon> {
        let mut connection = self.get_pooled_connection().await;

        pokemon::table
            .order(pokemon::id)
            .select(Pokemon::as_select())
            .load(&mut connection)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        debug!("Connecting to test DB to perform cleanup");
        let db_url = get_db_url().unwrap();
        let mut connection = SyncConnection::establish(&db_url).unwrap();

        debug!("Deleting all pokemon in test DB");
        let deleted_count =
            diesel::RunQueryDsl::execute(delete(pokemon::table), &mut connection).unwrap();
        trace!("Cleaned up {} pokemon from test DB", deleted_count);
    }
}
