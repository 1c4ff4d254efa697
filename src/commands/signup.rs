// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use anyhow::Result;
use marathon_dashboard::Dashboard;

use super::credentials;

/// Register the configured account.
pub async fn run(dashboard: &Dashboard) -> Result<()> {
    let (email, password) = credentials(dashboard.config())?;
    let user = dashboard.identity().sign_up(&email, &password).await?;

    println!("Account created for {}", email);
    println!("User ID: {}", user.uid);
    Ok(())
}
