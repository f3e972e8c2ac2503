//! tests/http_tests.rs
//! Pruebas de extremo a extremo sobre las rutas de `app::init_app`.

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use super::auth_tests::{auth_service, crear_usuario};
use super::*;
use crate::app;
use crate::models::usuario_model::{LoginRequest, Rol};
use crate::services::{auth_service::SESSION_COOKIE, log_service::LogService};

macro_rules! app_de_prueba {
    ($pool:expr) => {{
        let pool = $pool.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(auth_service(&pool, 12)))
                .app_data(web::Data::new(LogService::new(pool.clone())))
                .app_data(web::Data::new(CatalogoService::new(pool.clone())))
                .app_data(web::Data::new(ElementoService::new(pool.clone())))
                .app_data(web::Data::new(movimiento_service(&pool)))
                .app_data(web::Data::new(SignatureService::new(SignatureBackend::Inline)))
                .configure(app::init_app),
        )
        .await
    }};
}

async fn token_de(pool: &Pool<Sqlite>, email: &str) -> String {
    auth_service(pool, 12)
        .login(LoginRequest {
            email: email.into(),
            password: "secreto123".into(),
        })
        .await
        .unwrap()
        .token
}

#[actix_rt::test]
async fn login_y_sesion_por_cookie() {
    let pool = pool_de_prueba().await;
    crear_usuario(&auth_service(&pool, 12), "ana@ejemplo.com", Rol::Operador).await;
    let app = app_de_prueba!(pool);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "ana@ejemplo.com", "password": "secreto123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .expect("cookie de sesión");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], "ana@ejemplo.com");
    assert_eq!(body["rol"], "OPERADOR");

    // El mismo token vale como Bearer
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn sin_sesion_401_y_sin_rol_403() {
    let pool = pool_de_prueba().await;
    crear_usuario(&auth_service(&pool, 12), "ana@ejemplo.com", Rol::Operador).await;
    let app = app_de_prueba!(pool);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "ana@ejemplo.com", "password": "incorrecta" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let token = token_de(&pool, "ana@ejemplo.com").await;
    let req = test::TestRequest::post()
        .uri("/api/sedes")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "nombre": "Sede Norte" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_rt::test]
async fn prestamo_por_http_y_errores_de_stock() {
    let pool = pool_de_prueba().await;
    crear_usuario(&auth_service(&pool, 12), "admin@ejemplo.com", Rol::Admin).await;
    let catalogo = catalogo_basico(&pool).await;
    let elemento = crear_elemento(&pool, &catalogo, "HTTP-001", 2).await;
    let app = app_de_prueba!(pool);
    let token = token_de(&pool, "admin@ejemplo.com").await;
    let bearer = ("Authorization", format!("Bearer {}", token));
    let fecha = (chrono::Utc::now() + chrono::Duration::days(3)).to_rfc3339();

    let req = test::TestRequest::post()
        .uri("/api/movimientos/prestamos")
        .insert_header(bearer.clone())
        .set_json(json!({
            "elemento_id": elemento.id,
            "cantidad": 2,
            "solicitante": "Luis",
            "fecha_devolucion_prevista": fecha
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["movimiento"]["tipo"], "SALIDA");
    assert!(body["ticket"]["numero"]
        .as_str()
        .unwrap()
        .ends_with("-00001"));

    let req = test::TestRequest::post()
        .uri("/api/movimientos/prestamos")
        .insert_header(bearer.clone())
        .set_json(json!({
            "elemento_id": elemento.id,
            "cantidad": 1,
            "solicitante": "Luis",
            "fecha_devolucion_prevista": fecha
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/elementos/{}/disponibilidad", elemento.id))
        .insert_header(bearer.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "total": 2, "prestado": 2, "disponible": 0 }));

    let req = test::TestRequest::get()
        .uri("/api/elementos/no-existe")
        .insert_header(bearer)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn bitacora_solo_para_administradores() {
    let pool = pool_de_prueba().await;
    let auth = auth_service(&pool, 12);
    crear_usuario(&auth, "admin@ejemplo.com", Rol::Admin).await;
    crear_usuario(&auth, "ana@ejemplo.com", Rol::Operador).await;
    let app = app_de_prueba!(pool);
    let admin = ("Authorization", format!("Bearer {}", token_de(&pool, "admin@ejemplo.com").await));
    let operador = ("Authorization", format!("Bearer {}", token_de(&pool, "ana@ejemplo.com").await));

    let req = test::TestRequest::post()
        .uri("/api/sedes")
        .insert_header(admin.clone())
        .set_json(json!({ "nombre": "Sede Norte" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/logs?entidad=sede")
        .insert_header(operador)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::get()
        .uri("/api/logs?entidad=sede")
        .insert_header(admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["accion"], "CREAR");
}

#[actix_rt::test]
async fn subir_firma_devuelve_url() {
    let pool = pool_de_prueba().await;
    crear_usuario(&auth_service(&pool, 12), "ana@ejemplo.com", Rol::Operador).await;
    let app = app_de_prueba!(pool);
    let bearer = ("Authorization", format!("Bearer {}", token_de(&pool, "ana@ejemplo.com").await));

    let req = test::TestRequest::post()
        .uri("/api/uploads/firma")
        .insert_header(bearer.clone())
        .set_json(json!({ "data_url": PNG_1X1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["url"], PNG_1X1);

    let req = test::TestRequest::post()
        .uri("/api/uploads/firma")
        .insert_header(bearer)
        .set_json(json!({ "data_url": "data:text/plain;base64,aG9sYQ==" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/api/uploads/firma")
        .set_json(json!({ "data_url": PNG_1X1 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
