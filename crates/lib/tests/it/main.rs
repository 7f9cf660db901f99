/*! Integration tests for haus-auth.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - scope: Catalog lookup and the hierarchical scope predicates
 * - credentials: Password derivation and verification
 * - session: Session lifecycle and lazy expiry
 * - user: The user directory
 * - access: Login, principal lookup and scope gating
 * - store: The AuthStore implementations
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("haus_auth=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod access;
mod credentials;
mod helpers;
mod session;
mod user;
