use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, Rng};
use tracing::{info, debug, warn, instrument};

use models::Role;

use super::domain::{
    AuthSession, AuthUser, ForgotPasswordInput, LoginInput, NewAccount, RegisterInput, ResetPasswordInput, VerifyInput,
};
use super::errors::AuthError;
use super::mailer::{MailMessage, Mailer};
use super::repository::AuthRepository;
use super::token::{self, Claims, TokenKeys};

pub const PASSWORD_ALGORITHM: &str = "argon2id";
const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub verification_code_ttl: Duration,
    pub frontend_url: String,
}

impl AuthSettings {
    pub fn from_config(auth: &configs::AuthConfig, mail: &configs::MailConfig) -> Self {
        Self {
            jwt_secret: auth.jwt_secret.clone(),
            token_ttl: Duration::hours(auth.token_ttl_hours),
            reset_token_ttl: Duration::minutes(auth.reset_token_ttl_minutes),
            verification_code_ttl: Duration::minutes(auth.verification_code_ttl_minutes),
            frontend_url: mail.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Defaults with the given secret; handy for tests and doc examples.
    pub fn with_secret(secret: &str) -> Self {
        Self::from_config(
            &configs::AuthConfig { jwt_secret: secret.to_string(), ..Default::default() },
            &configs::MailConfig::default(),
        )
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

fn verification_code() -> String {
    format!("{:06}", OsRng.gen_range(0..1_000_000u32))
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    mailer: Arc<dyn Mailer>,
    keys: TokenKeys,
    cfg: AuthSettings,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, mailer: Arc<dyn Mailer>, cfg: AuthSettings) -> Self {
        let keys = TokenKeys::new(&cfg.jwt_secret);
        Self { repo, mailer, keys, cfg }
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        self.keys.issue(user.id, &user.email, user.role, token::ACCESS, self.cfg.token_ttl)
    }

    /// Register a new account, store its password hash and mail the verification code.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthSettings, repository::mock::MockAuthRepository};
    /// use service::auth::mailer::mock::RecordingMailer;
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let mailer = Arc::new(RecordingMailer::default());
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), mailer.clone(), AuthSettings::with_secret("secret"));
    /// let input = RegisterInput {
    ///     email: "user@example.com".into(), password: "Secret123".into(),
    ///     first_name: "Test".into(), last_name: "User".into(), role: None, team_id: None,
    /// };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.user.is_verified);
    /// assert_eq!(mailer.sent().len(), 1);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let role = input.role.unwrap_or_default();
        if role.is_privileged() {
            warn!(role = %role, "privileged self-registration rejected");
            return Err(AuthError::Forbidden(format!("cannot self-register with role {role}")));
        }
        models::user::validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user::validate_name("firstName", &input.first_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user::validate_name("lastName", &input.last_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_password(&input.password)?;

        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let code = verification_code();
        let user = self
            .repo
            .create_user(NewAccount {
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                role,
                team_id: input.team_id,
                is_verified: false,
                verification_code: Some(code.clone()),
                verification_code_expires_at: Some(Utc::now() + self.cfg.verification_code_ttl),
            })
            .await?;
        self.repo.upsert_password(user.id, hash, PASSWORD_ALGORITHM.into()).await?;

        let message = MailMessage {
            to: user.email.clone(),
            subject: "Welcome to GearGuard - verify your email".into(),
            body: format!(
                "Hi {}, welcome to GearGuard!\nYour verification code is {} (valid for {} minutes).",
                user.first_name,
                code,
                self.cfg.verification_code_ttl.num_minutes()
            ),
        };
        if let Err(e) = self.mailer.send(message).await {
            warn!(user_id = %user.id, error = %e, "verification mail failed");
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(AuthSession { user, token })
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn verify(&self, input: VerifyInput) -> Result<AuthUser, AuthError> {
        let user = self.repo.find_user_by_email(&input.email).await?.ok_or(AuthError::NotFound)?;
        if user.is_verified {
            return Err(AuthError::Validation("email already verified".into()));
        }
        if user.verification_code.as_deref() != Some(input.code.trim()) {
            return Err(AuthError::Validation("invalid verification code".into()));
        }
        match user.verification_code_expires_at {
            Some(exp) if exp >= Utc::now() => {}
            _ => return Err(AuthError::Validation("verification code expired".into())),
        }
        self.repo.mark_verified(user.id).await?;
        info!(user_id = %user.id, "user_verified");
        Ok(AuthUser { is_verified: true, verification_code: None, verification_code_expires_at: None, ..user })
    }

    /// Authenticate a user and issue an access token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthSettings, repository::mock::MockAuthRepository};
    /// use service::auth::mailer::mock::RecordingMailer;
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), Arc::new(RecordingMailer::default()), AuthSettings::with_secret("secret"));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput {
    ///     email: "u@e.com".into(), password: "Passw0rd".into(),
    ///     first_name: "N".into(), last_name: "M".into(), role: None, team_id: None,
    /// }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, "login failed: bad password");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Resolve a bearer token to its current user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims: Claims = self.keys.verify(token, token::ACCESS)?;
        self.repo.find_user_by_id(claims.sub).await?.ok_or(AuthError::InvalidToken)
    }

    pub async fn current_user(&self, id: uuid::Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    /// Always succeeds for well-formed input so callers cannot enumerate accounts.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> Result<(), AuthError> {
        let Some(user) = self.repo.find_user_by_email(&input.email).await? else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };
        let reset = self.keys.issue(user.id, &user.email, user.role, token::RESET, self.cfg.reset_token_ttl)?;
        let link = format!("{}/reset-password?token={}", self.cfg.frontend_url, reset);
        let message = MailMessage {
            to: user.email.clone(),
            subject: "GearGuard password reset".into(),
            body: format!(
                "Use this link to reset your password (valid for {} minutes):\n{}",
                self.cfg.reset_token_ttl.num_minutes(),
                link
            ),
        };
        if let Err(e) = self.mailer.send(message).await {
            warn!(user_id = %user.id, error = %e, "reset mail failed");
        }
        info!(user_id = %user.id, "password_reset_requested");
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError> {
        let claims = self.keys.verify(&input.token, token::RESET)?;
        validate_password(&input.new_password)?;
        let user = self.repo.find_user_by_id(claims.sub).await?.ok_or(AuthError::InvalidToken)?;
        let hash = hash_password(&input.new_password)?;
        self.repo.upsert_password(user.id, hash, PASSWORD_ALGORITHM.into()).await?;
        info!(user_id = %user.id, "password_reset");
        Ok(())
    }

    /// Create the configured administrator when no account uses that email yet.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
        if self.repo.find_user_by_email(email).await?.is_some() {
            debug!("bootstrap admin already present");
            return Ok(None);
        }
        models::user::validate_email(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_password(password)?;
        let hash = hash_password(password)?;
        let user = self
            .repo
            .create_user(NewAccount {
                email: email.to_string(),
                first_name: "System".into(),
                last_name: "Administrator".into(),
                role: Role::Admin,
                team_id: None,
                is_verified: true,
                verification_code: None,
                verification_code_expires_at: None,
            })
            .await?;
        self.repo.upsert_password(user.id, hash, PASSWORD_ALGORITHM.into()).await?;
        info!(user_id = %user.id, email = %user.email, "bootstrap_admin_created");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mailer::mock::RecordingMailer;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (AuthService<MockAuthRepository>, Arc<MockAuthRepository>, Arc<RecordingMailer>) {
        let repo = Arc::new(MockAuthRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let svc = AuthService::new(repo.clone(), mailer.clone(), AuthSettings::with_secret("test-secret"));
        (svc, repo, mailer)
    }

    fn input(email: &str, role: Option<Role>) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            password: "Passw0rd!".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role,
            team_id: None,
        }
    }

    fn mailed_code(mailer: &RecordingMailer, to: &str) -> String {
        let body = mailer.last_to(to).expect("mail sent").body;
        body.split_whitespace()
            .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
            .expect("code in body")
            .to_string()
    }

    #[tokio::test]
    async fn privileged_roles_cannot_self_register() {
        let (svc, _, _) = svc();
        for role in [Role::Admin, Role::Manager] {
            let err = svc.register(input("boss@example.com", Some(role))).await.unwrap_err();
            assert!(matches!(err, AuthError::Forbidden(_)));
        }
        let ok = svc.register(input("tech@example.com", Some(Role::Technician))).await.unwrap();
        assert_eq!(ok.user.role, Role::Technician);
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicates() {
        let (svc, _, _) = svc();
        let mut short = input("a@example.com", None);
        short.password = "short".into();
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(input("no-at-sign", None)).await, Err(AuthError::Validation(_))));

        let session = svc.register(input("a@example.com", None)).await.unwrap();
        assert_eq!(session.user.role, Role::User);
        assert!(matches!(svc.register(input("a@example.com", None)).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn verify_with_mailed_code() {
        let (svc, _, mailer) = svc();
        svc.register(input("v@example.com", None)).await.unwrap();
        let code = mailed_code(&mailer, "v@example.com");

        let wrong = VerifyInput { email: "v@example.com".into(), code: "000000x".into() };
        assert!(matches!(svc.verify(wrong).await, Err(AuthError::Validation(_))));

        let user = svc.verify(VerifyInput { email: "v@example.com".into(), code: code.clone() }).await.unwrap();
        assert!(user.is_verified);
        let again = svc.verify(VerifyInput { email: "v@example.com".into(), code }).await;
        assert!(matches!(again, Err(AuthError::Validation(m)) if m.contains("already")));

        let missing = svc.verify(VerifyInput { email: "nobody@example.com".into(), code: "123456".into() }).await;
        assert!(matches!(missing, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn expired_verification_code_is_rejected() {
        let repo = Arc::new(MockAuthRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let settings = AuthSettings { verification_code_ttl: Duration::minutes(-1), ..AuthSettings::with_secret("test-secret") };
        let svc = AuthService::new(repo, mailer.clone(), settings);
        let session = svc.register(input("late@example.com", None)).await.unwrap();
        let code = mailed_code(&mailer, "late@example.com");

        let err = svc.verify(VerifyInput { email: "late@example.com".into(), code }).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m.contains("expired")));
        let user = svc.current_user(session.user.id).await.unwrap();
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn login_failures_look_identical() {
        let (svc, _, _) = svc();
        svc.register(input("l@example.com", None)).await.unwrap();
        let bad_pw = svc.login(LoginInput { email: "l@example.com".into(), password: "wrong-password".into() }).await.unwrap_err();
        let no_user = svc.login(LoginInput { email: "x@example.com".into(), password: "Passw0rd!".into() }).await.unwrap_err();
        assert_eq!(bad_pw.to_string(), no_user.to_string());

        let session = svc.login(LoginInput { email: "l@example.com".into(), password: "Passw0rd!".into() }).await.unwrap();
        let me = svc.authenticate(&session.token).await.unwrap();
        assert_eq!(me.id, session.user.id);
        assert!(svc.authenticate("garbage").await.is_err());
    }

    #[tokio::test]
    async fn forgot_and_reset_password() {
        let (svc, _, mailer) = svc();
        svc.register(input("r@example.com", None)).await.unwrap();

        svc.forgot_password(ForgotPasswordInput { email: "ghost@example.com".into() }).await.unwrap();
        assert!(mailer.last_to("ghost@example.com").is_none());

        svc.forgot_password(ForgotPasswordInput { email: "r@example.com".into() }).await.unwrap();
        let body = mailer.last_to("r@example.com").unwrap().body;
        let token = body.split("token=").nth(1).unwrap().trim().to_string();

        // a reset token is not an access token
        assert!(svc.authenticate(&token).await.is_err());

        svc.reset_password(ResetPasswordInput { token: token.clone(), new_password: "N3wPassword".into() }).await.unwrap();
        assert!(svc.login(LoginInput { email: "r@example.com".into(), password: "Passw0rd!".into() }).await.is_err());
        assert!(svc.login(LoginInput { email: "r@example.com".into(), password: "N3wPassword".into() }).await.is_ok());

        let access = svc.login(LoginInput { email: "r@example.com".into(), password: "N3wPassword".into() }).await.unwrap().token;
        let err = svc.reset_password(ResetPasswordInput { token: access, new_password: "Another123".into() }).await;
        assert!(matches!(err, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let (svc, _, _) = svc();
        let created = svc.ensure_admin("admin@example.com", "Adm1nPassword").await.unwrap();
        assert_eq!(created.map(|u| u.role), Some(Role::Admin));
        assert!(svc.ensure_admin("admin@example.com", "Adm1nPassword").await.unwrap().is_none());
        assert!(svc.login(LoginInput { email: "admin@example.com".into(), password: "Adm1nPassword".into() }).await.is_ok());
    }
}
