use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use tiffin_vendor_kit::config::Config;
use tiffin_vendor_kit::services::{
    DeliveryClient, DeliverySession, FixedLocation, ImageResolver, SessionStore, VendorApi,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting tiffin vendor kit...");

    let config = Config::from_env()?;

    let resolver = Arc::new(ImageResolver::from_config(&config.images)?);
    log::info!("✅ Image resolver initialized");

    // Serve first; nothing below should delay the dashboard's image endpoints
    #[cfg(feature = "http-server")]
    {
        tiffin_vendor_kit::server::spawn(&config.server_addr, resolver.clone()).await?;
        log::info!("✅ HTTP server started");
    }

    // Vendor API needs a token from the identity provider
    match &config.api.vendor_token {
        Some(token) => {
            let api = VendorApi::new(config.api.base_url.clone(), token.clone());
            match api.ensure_vendor().await {
                Ok(vendor) => log::info!("✅ Signed in as vendor '{}' ({})", vendor.business_name, vendor.id),
                Err(e) => log::error!("❌ Vendor API unavailable: {}", e),
            }

            match api.dashboard_overview().await {
                Ok(overview) => log::info!(
                    "📊 {} orders, {} pending, revenue {:.2}",
                    overview.stats.total_orders,
                    overview.stats.pending_orders,
                    overview.stats.total_revenue
                ),
                Err(e) => log::warn!("⚠️ Dashboard unavailable: {}", e),
            }
        }
        None => log::warn!("⚠️ VENDOR_TOKEN not set, vendor API calls disabled"),
    }

    // Delivery tracking is optional; a failed login leaves the rest running
    let mut delivery = None;
    if let Some(delivery_config) = &config.delivery {
        let client = Arc::new(DeliveryClient::new(config.api.base_url.clone())?);
        let mut session = DeliverySession::new(client, Arc::new(FixedLocation(delivery_config.location)))
            .with_interval(delivery_config.ping_interval)
            .with_store(SessionStore::new(delivery_config.session_file.clone()));

        match session
            .resume_or_login(&delivery_config.phone, &delivery_config.password)
            .await
        {
            Ok(()) => {
                match session.assignments().await {
                    Ok(assignments) => log::info!("📦 {} assignments", assignments.len()),
                    Err(e) => log::warn!("⚠️ Could not fetch assignments: {}", e),
                }
                log::info!("✅ Delivery tracking started");
                delivery = Some(session);
            }
            Err(e) => log::error!("❌ Delivery login failed, tracking disabled: {}", e),
        }
    }

    log::info!("🎉 Ready! Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    log::info!("🛑 Shutting down...");
    if let Some(mut session) = delivery {
        session.logout().await?;
    }

    Ok(())
}
