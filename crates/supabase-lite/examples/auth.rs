//! Sign-up, sign-in, user lookup and sign-out.
//!
//! Run with: cargo run --example auth -p supabase-lite

use supabase_lite::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = SupabaseClient::from_env()?;
    let auth = client.auth();

    let email =
        std::env::var("EXAMPLE_EMAIL").unwrap_or_else(|_| "example@example.com".to_string());
    let password = "example-password-123";

    match auth.sign_up(&email, password).await {
        Ok(resp) => println!("Signed up; session issued: {}", resp.session.is_some()),
        Err(AuthError::Api { error_code: Some(AuthErrorCode::UserAlreadyExists), .. }) => {
            println!("User already exists");
        }
        Err(e) => return Err(e.into()),
    }

    let session = auth.sign_in_with_password(&email, password).await?;
    println!("Signed in, token expires in {}s", session.expires_in);

    // Query as the signed-in user.
    let user_client = SupabaseClient::new(
        client.config().clone().access_token(session.access_token.clone()),
    )?;
    let user = user_client.auth().get_user(&session.access_token).await?;
    println!("User: {} ({:?})", user.id, user.email);

    let user = auth
        .update_user(
            &session.access_token,
            &UserAttributes::default().data(object![("display_name", "Example")]),
        )
        .await?;
    println!("Metadata: {:?}", user.user_metadata);

    let refreshed = auth.refresh_session(&session.refresh_token).await?;
    auth.sign_out(&refreshed.access_token).await?;
    println!("Signed out");

    Ok(())
}
