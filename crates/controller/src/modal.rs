//! Create / edit modal state.

use backoffice_core::types::DbId;

/// Which form, if any, is open over the list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState<P> {
    #[default]
    Closed,
    Create {
        form: P,
    },
    /// `form` is a snapshot of the resource taken when the modal opened.
    Edit {
        id: DbId,
        form: P,
    },
}

impl<P> ModalState<P> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The resource being edited, if this is an edit modal.
    pub fn editing_id(&self) -> Option<DbId> {
        match self {
            Self::Edit { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&P> {
        match self {
            Self::Closed => None,
            Self::Create { form } | Self::Edit { form, .. } => Some(form),
        }
    }

    pub(crate) fn replace_form(&mut self, new_form: P) {
        match self {
            Self::Closed => {}
            Self::Create { form } | Self::Edit { form, .. } => *form = new_form,
        }
    }
}
