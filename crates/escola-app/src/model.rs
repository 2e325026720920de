// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Alunos,
    Professores,
    Turmas,
    Disciplinas,
}

impl TabKind {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Alunos,
        Self::Professores,
        Self::Turmas,
        Self::Disciplinas,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "painel",
            Self::Alunos => "alunos",
            Self::Professores => "professores",
            Self::Turmas => "turmas",
            Self::Disciplinas => "disciplinas",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aluno {
    pub id: AlunoId,
    pub nome: String,
    pub matricula: String,
    pub turma: String,
    #[serde(default)]
    pub nome_responsavel: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub nome: String,
    pub matricula: String,
    pub email: String,
    #[serde(default)]
    pub formacao: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turma {
    pub id: TurmaId,
    pub nome: String,
    pub ano: i32,
    pub turno: String,
    pub ativa: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disciplina {
    pub id: DisciplinaId,
    pub nome: String,
    pub codigo: String,
    pub carga_horaria: i32,
    pub ativa: bool,
}

/// Counters served by `GET /api/dashboard/stats/`. Field names are part of
/// the wire contract with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardStats {
    pub students: i64,
    pub teachers: i64,
    pub classes: i64,
    pub subjects: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// Chart payload the dashboard embeds as JSON next to a chart placeholder.
/// Unknown kinds and malformed payloads are skipped, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSpec {
    pub fn from_json(raw: &str) -> Option<Self> {
        let spec: Self = serde_json::from_str(raw).ok()?;
        if spec.labels.len() != spec.values.len() {
            return None;
        }
        Some(spec)
    }
}
