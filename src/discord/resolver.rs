//! Target-user resolution for command invocations.
//!
//! Resolution order, first match wins:
//! 1. the structured-option target (slash commands, pre-resolved),
//! 2. the first mentioned user,
//! 3. the first raw argument token looked up as a user id,
//! 4. the invoker.
//!
//! An explicit raw identifier that fails to resolve is a hard
//! `UserNotFound`, never a silent fallback to the invoker. This branch is
//! only reachable from text-prefixed commands; slash-command options arrive
//! already validated by the platform.

use crate::discord::directory::UserDirectory;
use crate::error::{Error, Result};
use crate::model::{Invocation, UserRef};

pub async fn resolve_target(
    invocation: &Invocation,
    directory: &dyn UserDirectory,
) -> Result<UserRef> {
    if let Some(target) = &invocation.explicit_target {
        return Ok(target.clone());
    }

    if let Some(first) = invocation.mentions.first() {
        return Ok(first.clone());
    }

    if let Some(arg) = invocation.args.first() {
        let id = arg
            .parse::<u64>()
            .map_err(|_| Error::UserNotFound(arg.clone()))?;
        // Any lookup failure counts as not-found, matching the platform
        // treating unknown ids and transport errors alike here.
        return directory
            .find_user(id)
            .await
            .map_err(|_| Error::UserNotFound(arg.clone()));
    }

    Ok(invocation.invoker.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InvocationKind;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeDirectory {
        users: HashMap<u64, UserRef>,
    }

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn find_user(&self, id: u64) -> Result<UserRef> {
            self.users
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::UserNotFound(id.to_string()))
        }

        async fn fetch_full_user(&self, id: u64) -> Result<UserRef> {
            self.find_user(id).await
        }
    }

    fn user(id: u64, name: &str) -> UserRef {
        UserRef {
            id,
            username: name.to_string(),
            global_name: None,
            discriminator: None,
            avatar: None,
            banner: None,
            about_me: None,
            bot: false,
        }
    }

    fn invocation(invoker: UserRef) -> Invocation {
        Invocation {
            kind: InvocationKind::TextPrefixed,
            explicit_target: None,
            mentions: Vec::new(),
            args: Vec::new(),
            invoker,
            guild_id: None,
        }
    }

    fn directory() -> FakeDirectory {
        FakeDirectory {
            users: HashMap::from([(42, user(42, "known"))]),
        }
    }

    #[tokio::test]
    async fn explicit_option_wins() {
        let mut inv = invocation(user(1, "invoker"));
        inv.kind = InvocationKind::Structured;
        inv.explicit_target = Some(user(2, "picked"));
        inv.mentions.push(user(3, "mentioned"));

        let resolved = resolve_target(&inv, &directory()).await.unwrap();
        assert_eq!(resolved.id, 2);
    }

    #[tokio::test]
    async fn first_mention_beats_args() {
        let mut inv = invocation(user(1, "invoker"));
        inv.mentions = vec![user(3, "first"), user(4, "second")];
        inv.args = vec!["42".to_string()];

        let resolved = resolve_target(&inv, &directory()).await.unwrap();
        assert_eq!(resolved.id, 3);
    }

    #[tokio::test]
    async fn raw_id_argument_resolves() {
        let mut inv = invocation(user(1, "invoker"));
        inv.args = vec!["42".to_string()];

        let resolved = resolve_target(&inv, &directory()).await.unwrap();
        assert_eq!(resolved.id, 42);
        assert_eq!(resolved.username, "known");
    }

    #[tokio::test]
    async fn unknown_raw_id_is_not_found_not_fallback() {
        let mut inv = invocation(user(1, "invoker"));
        inv.args = vec!["999".to_string()];

        let err = resolve_target(&inv, &directory()).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound(_)));
    }

    #[tokio::test]
    async fn non_numeric_argument_is_not_found() {
        let mut inv = invocation(user(1, "invoker"));
        inv.args = vec!["garbage".to_string()];

        let err = resolve_target(&inv, &directory()).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound(_)));
    }

    #[tokio::test]
    async fn falls_back_to_invoker() {
        let inv = invocation(user(1, "invoker"));
        let resolved = resolve_target(&inv, &directory()).await.unwrap();
        assert_eq!(resolved.id, 1);
    }
}
