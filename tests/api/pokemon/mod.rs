use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use pokemon_manager::api::errors::ErrorResponse;
use pokemon_manager::api::flash::FLASH_COOKIE;

/// Checks that a response redirects to the Pokemon listing with the given flash message.
fn assert_redirect_with_flash(result: &ServiceResponse, expected_message: &str) {
    assert_eq!(StatusCode::FOUND, result.status());
    assert_eq!(
        Some("/pokemon"),
        result
            .headers()
            .get(header::LOCATION)
            .and_then(|location| location.to_str().ok())
    );

    let flash: Vec<Cookie> = result
        .response()
        .cookies()
        .filter(|cookie| cookie.name() == FLASH_COOKIE)
        .collect();
    assert_eq!(1, flash.len());
    assert_eq!(expected_message, flash[0].value());
}

async fn read_error_response(result: ServiceResponse) -> ErrorResponse {
    actix_web::test::read_body_json(result).await
}

mod list {
    use actix_web::cookie::Cookie;
    use actix_web::test;
    use pokemon_manager::api::flash::FLASH_COOKIE;
    use pokemon_manager::api::pokemon::views::PokemonListing;
    use serial_test::file_serial;

    use crate::init_test_service;
    use crate::integration_helpers::factories::pokemon::build_create_pokemons;

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_empty_list() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokemon").to_request();
        let listing: PokemonListing = test::call_and_read_body_json(&service, req).await;

        assert!(listing.pokemon.is_empty());
        assert_eq!(None, listing.success);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_ordered_by_id() {
        init_test_service!(app, service);

        let mut inserted = Vec::new();
        for new_pokemon in build_create_pokemons(3) {
            inserted.push(app.insert_pokemon(&new_pokemon).await);
        }

        let req = test::TestRequest::with_uri("/pokemon").to_request();
        let listing: PokemonListing = test::call_and_read_body_json(&service, req).await;

        assert_eq!(inserted, listing.pokemon);
        assert!(listing.pokemon.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_flash_is_consumed() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokemon")
            .cookie(Cookie::new(FLASH_COOKIE, "Pokemon deleted successfully."))
            .to_request();
        let result = test::call_service(&service, req).await;

        let removal: Vec<_> = result
            .response()
            .cookies()
            .filter(|cookie| cookie.name() == FLASH_COOKIE)
            .map(|cookie| (cookie.value().to_string(), cookie.max_age()))
            .collect();
        assert_eq!(1, removal.len());
        assert_eq!("", removal[0].0);
        assert!(removal[0].1.is_some_and(|max_age| max_age.is_zero()));

        let listing: PokemonListing = test::read_body_json(result).await;
        assert_eq!(Some("Pokemon deleted successfully.".to_string()), listing.success);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_no_removal_cookie_without_flash() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokemon").to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(0, result.response().cookies().count());
    }
}

mod create_form {
    use actix_web::test;
    use pokemon_manager::api::pokemon::views::PokemonForm;
    use serial_test::file_serial;

    use crate::init_test_service;

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_empty_form() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokemon/create").to_request();
        let form: PokemonForm = test::call_and_read_body_json(&service, req).await;

        assert_eq!(PokemonForm::create(), form);
        assert_eq!(None, form.pokemon);
    }
}

mod create {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pokemon_manager::api::pokemon::views::PokemonListing;
    use pokemon_manager::models::pokemon::validations::MAX_IMAGE_SIZE;
    use serde_json::json;
    use serial_test::file_serial;

    use super::{assert_redirect_with_flash, read_error_response};
    use crate::init_test_service;
    use crate::integration_helpers::factories::pokemon::{
        build_bulbasaur_upload, JPEG_IMAGE, PNG_IMAGE,
    };
    use crate::integration_helpers::multipart::MultipartBody;

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_create_pokemon() {
        init_test_service!(app, service);

        let req = build_bulbasaur_upload()
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_redirect_with_flash(&result, "Pokemon created successfully.");

        let req = test::TestRequest::with_uri("/pokemon").to_request();
        let listing: PokemonListing = test::call_and_read_body_json(&service, req).await;
        assert_eq!(1, listing.pokemon.len());

        let created = &listing.pokemon[0];
        assert_eq!("Bulbasaur", created.name);
        assert_eq!("Grass", created.type_);
        assert_eq!(45, created.power);
        assert!(created.created_at.is_some());
        assert!(created.image.starts_with("images/"));
        assert!(created.image.ends_with(".jpg"));

        let stored = app.get_storage().resolve(&created.image);
        assert!(stored.starts_with(app.public_dir()));
        assert_eq!(JPEG_IMAGE, std::fs::read(stored).unwrap());
        assert_eq!(1, app.stored_images().len());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_uploads_do_not_overwrite_each_other() {
        init_test_service!(app, service);

        for _ in 0..2 {
            let req = build_bulbasaur_upload()
                .into_request(test::TestRequest::post().uri("/pokemon"))
                .to_request();
            let result = test::call_service(&service, req).await;
            assert_eq!(StatusCode::FOUND, result.status());
        }

        let created = app.list_pokemon().await;
        assert_eq!(2, created.len());
        assert_ne!(created[0].image, created[1].image);
        assert_eq!(2, app.stored_images().len());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_missing_fields() {
        init_test_service!(app, service);

        let req = MultipartBody::new()
            .text("name", "Bulbasaur")
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());

        let error_response = read_error_response(result).await;
        assert_eq!(
            Some(vec!["image".to_string(), "power".to_string(), "type".to_string()]),
            error_response.invalid_fields
        );

        assert!(app.list_pokemon().await.is_empty());
        assert!(app.stored_images().is_empty());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_invalid_power() {
        init_test_service!(app, service);

        let req = MultipartBody::new()
            .text("name", "Bulbasaur")
            .text("type", "Grass")
            .text("power", "over 9000")
            .file("image", "bulbasaur.jpg", "image/jpeg", JPEG_IMAGE)
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());

        let error_response = read_error_response(result).await;
        assert_eq!(Some(vec!["power".to_string()]), error_response.invalid_fields);
        assert!(app.list_pokemon().await.is_empty());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_not_an_image() {
        init_test_service!(app, service);

        let req = MultipartBody::new()
            .text("name", "Bulbasaur")
            .text("type", "Grass")
            .text("power", "45")
            .file("image", "bulbasaur.png", "image/png", b"%PDF-1.7\n")
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());

        let error_response = read_error_response(result).await;
        assert_eq!(Some(vec!["image".to_string()]), error_response.invalid_fields);
        assert!(app.list_pokemon().await.is_empty());
        assert!(app.stored_images().is_empty());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_wrong_extension() {
        init_test_service!(app, service);

        let req = MultipartBody::new()
            .text("name", "Bulbasaur")
            .text("type", "Grass")
            .text("power", "45")
            .file("image", "bulbasaur.bmp", "image/bmp", PNG_IMAGE)
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());
        assert!(app.list_pokemon().await.is_empty());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_image_too_large() {
        init_test_service!(app, service);

        let mut content = PNG_IMAGE.to_vec();
        content.resize(MAX_IMAGE_SIZE + 1, 0);

        let req = MultipartBody::new()
            .text("name", "Bulbasaur")
            .text("type", "Grass")
            .text("power", "45")
            .file("image", "bulbasaur.png", "image/png", &content)
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());

        let error_response = read_error_response(result).await;
        assert_eq!(Some(vec!["image".to_string()]), error_response.invalid_fields);
        assert!(app.list_pokemon().await.is_empty());
        assert!(app.stored_images().is_empty());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_not_multipart() {
        init_test_service!(app, service);

        let req = test::TestRequest::post()
            .uri("/pokemon")
            .set_json(json!({ "name": "Bulbasaur", "type": "Grass", "power": 45 }))
            .to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::BAD_REQUEST, result.status());
        assert!(app.list_pokemon().await.is_empty());
    }
}

mod create_without_database {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use diesel_async::pooled_connection::AsyncDieselConnectionManager;
    use pokemon_manager::db::Pool;
    use pokemon_manager::pokemon_app;
    use pokemon_manager::storage::ImageStorage;
    use tempfile::TempDir;

    use crate::integration_helpers::factories::pokemon::build_bulbasaur_upload;

    #[test_log::test(actix_web::test)]
    async fn test_image_removed_when_insert_fails() {
        let manager =
            AsyncDieselConnectionManager::new("postgres://postgres@127.0.0.1:1/unreachable");
        let pool = Pool::builder(manager).build().unwrap();

        let public_dir = TempDir::new().unwrap();
        let storage = ImageStorage::new(public_dir.path()).unwrap();
        let service = test::init_service(pokemon_app!(pool, storage)).await;

        let req = build_bulbasaur_upload()
            .into_request(test::TestRequest::post().uri("/pokemon"))
            .to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, result.status());
        assert_eq!(0, std::fs::read_dir(storage.images_dir()).unwrap().count());
    }
}

mod edit_form {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pokemon_manager::api::pokemon::views::PokemonForm;
    use serial_test::file_serial;

    use crate::init_test_service;
    use crate::integration_helpers::factories::pokemon::build_create_pokemon;

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_exists() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&build_create_pokemon()).await;

        let req = test::TestRequest::with_uri(&format!("/pokemon/{}/edit", pokemon.id))
            .to_request();
        let form: PokemonForm = test::call_and_read_body_json(&service, req).await;

        assert_eq!(PokemonForm::edit(pokemon), form);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_does_not_exist() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri(&format!("/pokemon/{}/edit", i64::MAX)).to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, result.status());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_invalid_path_param() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokemon/foobar/edit").to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::BAD_REQUEST, result.status());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_negative_id() {
        init_test_service!(app, service);

        let req = test::TestRequest::with_uri("/pokemon/-1/edit").to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, result.status());
    }
}

mod update {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pokemon_manager::models::pokemon::CreatePokemon;
    use serde_json::json;
    use serial_test::file_serial;

    use super::{assert_redirect_with_flash, read_error_response};
    use crate::init_test_service;
    use crate::integration_helpers::factories::pokemon::build_create_pokemon;

    fn pikachu() -> CreatePokemon {
        CreatePokemon {
            name: "Pikachu".into(),
            type_: "Electric".into(),
            power: 55,
            image: "images/1732800648.png".into(),
        }
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_partial_update() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&pikachu()).await;

        let req = test::TestRequest::put()
            .uri(&format!("/pokemon/{}", pokemon.id))
            .set_json(json!({ "power": 60 }))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_redirect_with_flash(&result, "Pokemon updated successfully.");

        let updated = app.find_pokemon(pokemon.id).await.unwrap();
        assert_eq!(pokemon.id, updated.id);
        assert_eq!("Pikachu", updated.name);
        assert_eq!("Electric", updated.type_);
        assert_eq!(60, updated.power);
        assert_eq!(pokemon.image, updated.image);
        assert_eq!(pokemon.created_at, updated.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_patch_method() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&pikachu()).await;

        let req = test::TestRequest::patch()
            .uri(&format!("/pokemon/{}", pokemon.id))
            .set_json(json!({ "name": "Raichu", "type": "Electric", "image": "images/raichu.png" }))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_redirect_with_flash(&result, "Pokemon updated successfully.");

        let updated = app.find_pokemon(pokemon.id).await.unwrap();
        assert_eq!("Raichu", updated.name);
        assert_eq!(55, updated.power);
        assert_eq!("images/raichu.png", updated.image);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_update_nonexistent() {
        init_test_service!(app, service);

        let req = test::TestRequest::put()
            .uri(&format!("/pokemon/{}", i64::MAX))
            .set_json(json!({ "power": 60 }))
            .to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, result.status());
        assert!(app.list_pokemon().await.is_empty());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_update_negative_id() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&pikachu()).await;

        for req in [
            test::TestRequest::put().uri("/pokemon/-1"),
            test::TestRequest::patch().uri("/pokemon/-1"),
        ] {
            let req = req.set_json(json!({ "power": 60 })).to_request();
            let result = test::call_service(&service, req).await;

            assert_eq!(StatusCode::NOT_FOUND, result.status());
        }

        assert_eq!(Some(pokemon.clone()), app.find_pokemon(pokemon.id).await);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_unknown_fields_rejected() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&build_create_pokemon()).await;

        for body in [
            json!({ "id": pokemon.id + 1000 }),
            json!({ "power": 60, "created_at": "2000-01-01T00:00:00" }),
            json!({ "legendary": true }),
        ] {
            let req = test::TestRequest::put()
                .uri(&format!("/pokemon/{}", pokemon.id))
                .set_json(body)
                .to_request();
            let result = test::call_service(&service, req).await;

            assert_eq!(StatusCode::BAD_REQUEST, result.status());
        }

        assert_eq!(Some(pokemon.clone()), app.find_pokemon(pokemon.id).await);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_image_outside_public_storage() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&build_create_pokemon()).await;

        for image in ["../../etc/passwd", "http://example.com/pikachu.png", "images/../.env"] {
            let req = test::TestRequest::patch()
                .uri(&format!("/pokemon/{}", pokemon.id))
                .set_json(json!({ "image": image }))
                .to_request();
            let result = test::call_service(&service, req).await;
            assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());

            let error_response = read_error_response(result).await;
            assert_eq!(Some(vec!["image".to_string()]), error_response.invalid_fields);
        }

        assert_eq!(Some(pokemon.clone()), app.find_pokemon(pokemon.id).await);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_invalid_values() {
        init_test_service!(app, service);

        let pokemon = app.insert_pokemon(&build_create_pokemon()).await;

        let req = test::TestRequest::put()
            .uri(&format!("/pokemon/{}", pokemon.id))
            .set_json(json!({ "power": "a lot" }))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, result.status());

        let req = test::TestRequest::put()
            .uri(&format!("/pokemon/{}", pokemon.id))
            .set_json(json!({ "name": "", "type": "x".repeat(101) }))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, result.status());

        let error_response = read_error_response(result).await;
        assert_eq!(
            Some(vec!["name".to_string(), "type".to_string()]),
            error_response.invalid_fields
        );
        assert_eq!(Some(pokemon.clone()), app.find_pokemon(pokemon.id).await);
    }
}

mod delete {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serial_test::file_serial;

    use super::assert_redirect_with_flash;
    use crate::init_test_service;
    use crate::integration_helpers::factories::pokemon::build_create_pokemons;

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_delete_twice() {
        init_test_service!(app, service);

        let kept = app.insert_pokemon(&build_create_pokemons(2)[1]).await;
        let pokemon = app.insert_pokemon(&build_create_pokemons(1)[0]).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/pokemon/{}", pokemon.id))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_redirect_with_flash(&result, "Pokemon deleted successfully.");
        assert_eq!(None, app.find_pokemon(pokemon.id).await);

        let req = test::TestRequest::delete()
            .uri(&format!("/pokemon/{}", pokemon.id))
            .to_request();
        let result = test::call_service(&service, req).await;
        assert_eq!(StatusCode::NOT_FOUND, result.status());

        assert_eq!(vec![kept], app.list_pokemon().await);
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_delete_nonexistent() {
        init_test_service!(app, service);

        let req = test::TestRequest::delete()
            .uri(&format!("/pokemon/{}", i64::MAX))
            .to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, result.status());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_invalid_path_param() {
        init_test_service!(app, service);

        let req = test::TestRequest::delete().uri("/pokemon/foobar").to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::BAD_REQUEST, result.status());
    }

    #[test_log::test(actix_web::test)]
    #[file_serial(api_pokemon)]
    async fn test_negative_id() {
        init_test_service!(app, service);

        let kept = app.insert_pokemon(&build_create_pokemons(1)[0]).await;

        let req = test::TestRequest::delete().uri("/pokemon/-1").to_request();
        let result = test::call_service(&service, req).await;

        assert_eq!(StatusCode::NOT_FOUND, result.status());
        assert_eq!(vec![kept], app.list_pokemon().await);
    }
}
