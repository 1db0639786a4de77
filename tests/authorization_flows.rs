//! End-to-end authorization over the in-memory store: the full pipeline
//! from access token to allow/deny, including the disabled-principal,
//! tier-gate, role-gate, and primary-membership cases.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use aegis_auth::auth::token::TokenError;
use aegis_auth::models::membership::MemberRole;
use aegis_auth::models::tenant::{SubscriptionStatus, SubscriptionTier};
use aegis_auth::store::PrincipalStore;
use aegis_auth::{
    AuthError, AuthorizationEvaluator, NewAccount, PrincipalResolver, Requirement,
    SessionService, TenancyResolver,
};

use common::{token_service, MemoryDirectory};

struct Harness {
    directory: Arc<MemoryDirectory>,
    sessions: SessionService,
    resolver: PrincipalResolver,
    evaluator: AuthorizationEvaluator,
}

impl Harness {
    fn new() -> Self {
        let directory = MemoryDirectory::new();
        let tokens = token_service();
        Self {
            sessions: SessionService::new(directory.clone(), tokens.clone()),
            resolver: PrincipalResolver::new(tokens, directory.clone()),
            evaluator: AuthorizationEvaluator::new(TenancyResolver::new(directory.clone())),
            directory,
        }
    }

    async fn register(&self, email: &str) -> aegis_auth::RegisteredAccount {
        self.sessions
            .register(
                NewAccount {
                    email: email.to_string(),
                    password: "S3cure!Password".to_string(),
                    display_name: None,
                    company_name: Some("Acme".to_string()),
                },
                Utc::now(),
            )
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn protected_request_pipeline_allows_owner_on_paid_tier() {
    let h = Harness::new();
    let now = Utc::now();

    let registered = h.register("owner@acme.com").await;
    h.directory.set_subscription(
        registered.tenant.id,
        SubscriptionTier::Professional,
        SubscriptionStatus::Active,
    );

    // Token -> principal -> membership/tenant -> decision.
    let principal = h
        .resolver
        .resolve(&registered.tokens.access_token, now)
        .await
        .unwrap();

    let grant = h
        .evaluator
        .authorize(
            principal.id,
            None,
            &Requirement::both(SubscriptionTier::Professional, MemberRole::Admin),
            now,
        )
        .await
        .unwrap();

    assert_eq!(grant.tenant.id, registered.tenant.id);
    assert_eq!(grant.membership.role, MemberRole::Owner);
}

#[tokio::test]
async fn trial_tenant_is_denied_paid_tier_requirement() {
    let h = Harness::new();
    let now = Utc::now();

    let registered = h.register("owner@acme.com").await;

    let result = h
        .evaluator
        .authorize(
            registered.principal.id,
            None,
            &Requirement::tier(SubscriptionTier::Essentials),
            now,
        )
        .await;

    match result {
        Err(AuthError::InsufficientTier { required, actual }) => {
            assert_eq!(required, SubscriptionTier::Essentials);
            assert_eq!(actual, SubscriptionTier::Trial);
        }
        other => panic!("expected InsufficientTier, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn member_is_denied_admin_gated_action_with_detail() {
    let h = Harness::new();
    let now = Utc::now();

    let owner = h.register("owner@acme.com").await;
    let invitee = h.register("member@acme.com").await;

    // Invite the second principal into the first tenant as a member.
    h.directory.seed_membership(
        owner.tenant.id,
        invitee.principal.id,
        MemberRole::Member,
        now,
    );

    let result = h
        .evaluator
        .authorize(
            invitee.principal.id,
            Some(owner.tenant.id),
            &Requirement::role(MemberRole::Admin),
            now,
        )
        .await;

    match result {
        Err(AuthError::InsufficientRole { required, actual }) => {
            assert_eq!(required, MemberRole::Admin);
            assert_eq!(actual, MemberRole::Member);
        }
        other => panic!("expected InsufficientRole, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn non_member_is_denied_with_no_membership() {
    let h = Harness::new();
    let now = Utc::now();

    let owner = h.register("owner@acme.com").await;
    let outsider = h.register("outsider@other.com").await;

    let result = h
        .evaluator
        .authorize(
            outsider.principal.id,
            Some(owner.tenant.id),
            &Requirement::none(),
            now,
        )
        .await;
    assert!(matches!(result, Err(AuthError::NoMembership)));

    // A principal with no memberships at all is also denied.
    let result = h
        .evaluator
        .authorize(Uuid::new_v4(), None, &Requirement::none(), now)
        .await;
    assert!(matches!(result, Err(AuthError::NoMembership)));
}

#[tokio::test]
async fn disabled_principal_is_rejected_before_token_expiry() {
    let h = Harness::new();
    let now = Utc::now();

    let registered = h.register("owner@acme.com").await;

    // Token resolves while the principal is live.
    assert!(h
        .resolver
        .resolve(&registered.tokens.access_token, now)
        .await
        .is_ok());

    h.directory
        .deactivate_principal(registered.principal.id)
        .await
        .unwrap();

    // Same token, still inside its lifetime: rejected at resolution.
    let result = h
        .resolver
        .resolve(&registered.tokens.access_token, now + Duration::minutes(1))
        .await;
    assert!(matches!(result, Err(AuthError::PrincipalDisabled)));
}

#[tokio::test]
async fn refresh_token_is_not_accepted_for_resolution() {
    let h = Harness::new();
    let now = Utc::now();

    let registered = h.register("owner@acme.com").await;
    let result = h
        .resolver
        .resolve(&registered.tokens.refresh_token, now)
        .await;

    assert!(matches!(
        result,
        Err(AuthError::Token(TokenError::WrongTokenType { .. }))
    ));
}

#[tokio::test]
async fn expired_access_token_is_rejected_at_resolution() {
    let h = Harness::new();
    let now = Utc::now();

    let registered = h.register("owner@acme.com").await;
    let after_expiry = now + Duration::seconds(1801);

    let result = h
        .resolver
        .resolve(&registered.tokens.access_token, after_expiry)
        .await;
    assert!(matches!(
        result,
        Err(AuthError::Token(TokenError::Expired))
    ));
}

#[tokio::test]
async fn primary_membership_is_the_earliest_created() {
    let h = Harness::new();
    let now = Utc::now();

    let first_org = h.register("owner@first.com").await;
    let second_org = h.register("owner@second.com").await;

    // A principal invited into both tenants, newest membership first, so a
    // naive "first row" would pick the wrong one.
    let principal = h.register("multi@x.com").await.principal;
    h.directory.seed_membership(
        second_org.tenant.id,
        principal.id,
        MemberRole::Admin,
        now - Duration::days(1),
    );
    h.directory.seed_membership(
        first_org.tenant.id,
        principal.id,
        MemberRole::Viewer,
        now - Duration::days(30),
    );

    // Resolution without a tenant is deterministic: earliest membership wins
    // on every call.
    for _ in 0..3 {
        let grant = h
            .evaluator
            .authorize(principal.id, None, &Requirement::none(), now)
            .await
            .unwrap();
        assert_eq!(grant.tenant.id, first_org.tenant.id);
        assert_eq!(grant.membership.role, MemberRole::Viewer);
    }

    // Tenant switching is explicit.
    let grant = h
        .evaluator
        .authorize(
            principal.id,
            Some(second_org.tenant.id),
            &Requirement::role(MemberRole::Admin),
            now,
        )
        .await
        .unwrap();
    assert_eq!(grant.tenant.id, second_org.tenant.id);
}

#[tokio::test]
async fn lapsed_trial_loses_tier_gated_capabilities() {
    let h = Harness::new();
    let now = Utc::now();

    let registered = h.register("owner@acme.com").await;
    h.directory
        .set_trial_ends_at(registered.tenant.id, Some(now - Duration::days(1)));

    let result = h
        .evaluator
        .authorize(
            registered.principal.id,
            None,
            &Requirement::tier(SubscriptionTier::Trial),
            now,
        )
        .await;
    assert!(matches!(result, Err(AuthError::InsufficientTier { .. })));

    // Role-only requirements still pass for the lapsed trial.
    assert!(h
        .evaluator
        .authorize(
            registered.principal.id,
            None,
            &Requirement::role(MemberRole::Owner),
            now,
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn registered_principal_from_earlier_session_still_resolves() {
    // Two separate "requests" sharing only the directory and secret, as the
    // boundary layer would across calls.
    let directory = MemoryDirectory::new();
    let sessions = SessionService::new(directory.clone(), token_service());
    let now = Utc::now();

    let registered = sessions
        .register(
            NewAccount {
                email: "a@x.com".to_string(),
                password: "S3cure!Password".to_string(),
                display_name: None,
                company_name: None,
            },
            now,
        )
        .await
        .unwrap();

    let resolver = PrincipalResolver::new(token_service(), directory.clone());
    let principal = resolver
        .resolve(&registered.tokens.access_token, now)
        .await
        .unwrap();

    let stored = directory.find_principal(principal.id).await.unwrap();
    assert!(stored.is_some());
}
