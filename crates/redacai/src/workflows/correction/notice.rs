use serde::Serialize;

use super::controller::ControllerError;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Non-blocking notification the presentation layer shows for a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
    pub retryable: bool,
}

impl Notice {
    fn destructive(title: &str, description: String, retryable: bool) -> Self {
        Self {
            title: title.to_string(),
            description,
            variant: NoticeVariant::Destructive,
            retryable,
        }
    }

    pub fn from_error(error: &ControllerError) -> Self {
        match error {
            ControllerError::Validation(_) => Self::destructive(
                "Redação vazia",
                "Cole ou escreva sua redação antes de pedir a correção.".to_string(),
                false,
            ),
            ControllerError::QuotaExceeded(limit) => Self::destructive(
                "Limite diário atingido",
                format!(
                    "Você já usou suas {} correções gratuitas de hoje. Conheça os planos para continuar praticando.",
                    limit.daily_limit
                ),
                false,
            ),
            ControllerError::InFlight => Self {
                title: "Correção em andamento".to_string(),
                description: "Aguarde a análise atual terminar antes de enviar novamente."
                    .to_string(),
                variant: NoticeVariant::Default,
                retryable: true,
            },
            ControllerError::Evaluation(err) if err.is_network() => Self::destructive(
                "Não foi possível corrigir agora",
                "O serviço de correção não respondeu. Tente novamente em instantes.".to_string(),
                true,
            ),
            ControllerError::Evaluation(_) => Self::destructive(
                "Erro na correção",
                "Recebemos uma resposta inesperada do serviço de correção.".to_string(),
                true,
            ),
            ControllerError::AuthenticationRequired => Self {
                title: "Entre para ganhar uma correção extra".to_string(),
                description: "Faça login para liberar mais uma correção gratuita hoje."
                    .to_string(),
                variant: NoticeVariant::Default,
                retryable: false,
            },
            ControllerError::Storage(_) => Self::destructive(
                "Erro ao salvar seu limite diário",
                "Não conseguimos registrar o uso gratuito. Tente novamente.".to_string(),
                true,
            ),
        }
    }
}
