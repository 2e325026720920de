// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub default: String,
}

impl FormField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: String::new(),
            default: String::new(),
        }
    }

    pub fn with_default(name: &str, default: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: default.to_owned(),
            default: default.to_owned(),
        }
    }
}

/// An editable form plus its identity, the unit the auto-save watcher
/// snapshots on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub id: String,
    pub fields: Vec<FormField>,
}

impl FormDraft {
    pub fn new(id: &str, fields: Vec<FormField>) -> Self {
        Self {
            id: id.to_owned(),
            fields,
        }
    }

    /// The student-enrollment draft the cadastro modal edits.
    pub fn aluno() -> Self {
        Self::new(
            "aluno",
            vec![
                FormField::new("nome"),
                FormField::new("matricula"),
                FormField::new("turma"),
                FormField::new("nome_responsavel"),
                FormField::new("telefone_responsavel"),
                FormField::with_default("status", "ativo"),
            ],
        )
    }

    /// The teacher-request draft behind the requerimento modal.
    pub fn requerimento() -> Self {
        Self::new(
            "requerimento",
            vec![
                FormField::with_default("tipo", "declaracao"),
                FormField::new("descricao"),
            ],
        )
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns false when no field carries `name`; the caller skips
    /// silently, matching how a missing input is treated on the page.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.to_owned();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }

    /// Applies a stored snapshot. Snapshot entries with no matching field
    /// are ignored; fields absent from the snapshot keep their defaults.
    pub fn restore(&mut self, snapshot: &BTreeMap<String, String>) {
        for field in &mut self.fields {
            if let Some(value) = snapshot.get(&field.name) {
                field.value = value.clone();
            }
        }
    }

    /// Resets every field to its default, the `on_hidden` behavior of a
    /// dismissed modal.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value = field.default.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequerimentoTipo {
    Declaracao,
    Licenca,
    Material,
    Outro,
}

impl RequerimentoTipo {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Declaracao => "declaracao",
            Self::Licenca => "licenca",
            Self::Material => "material",
            Self::Outro => "outro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "declaracao" => Some(Self::Declaracao),
            "licenca" => Some(Self::Licenca),
            "material" => Some(Self::Material),
            "outro" => Some(Self::Outro),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequerimentoFormInput {
    pub tipo: RequerimentoTipo,
    pub descricao: String,
}

impl RequerimentoFormInput {
    pub fn from_draft(draft: &FormDraft) -> Result<Self> {
        let tipo_raw = draft
            .field("tipo")
            .map(|field| field.value.as_str())
            .unwrap_or("");
        let Some(tipo) = RequerimentoTipo::parse(tipo_raw) else {
            bail!("tipo de requerimento {tipo_raw:?} desconhecido -- escolha um tipo válido");
        };
        let descricao = draft
            .field("descricao")
            .map(|field| field.value.clone())
            .unwrap_or_default();
        Ok(Self { tipo, descricao })
    }

    pub fn validate(&self) -> Result<()> {
        if self.descricao.trim().is_empty() {
            bail!("descrição do requerimento é obrigatória -- preencha e tente novamente");
        }
        if self.descricao.chars().count() > 2000 {
            bail!("descrição do requerimento excede 2000 caracteres");
        }
        Ok(())
    }
}
