// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use escola_api::Client;
use escola_app::{
    Aluno, ChartKind, ChartSpec, Column, DashboardStats, Disciplina, Professor,
    RequerimentoFormInput, RequerimentoId, TabKind, TableModel, Theme, Turma,
};
use escola_store::Store;
use escola_tui::AppRuntime;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Bridges the TUI onto the HTTP client and the local store. With no
/// client (demo mode) the rosters come from the seeded demo data and
/// submissions are accepted without leaving the process.
pub struct ClientRuntime<'a> {
    api: Option<Client>,
    store: &'a Store,
    last_stats: Option<DashboardStats>,
}

impl<'a> ClientRuntime<'a> {
    pub fn new(api: Option<Client>, store: &'a Store) -> Self {
        Self {
            api,
            store,
            last_stats: None,
        }
    }
}

impl AppRuntime for ClientRuntime<'_> {
    fn load_dashboard_stats(&mut self) -> Result<DashboardStats> {
        let stats = match &self.api {
            Some(client) => client.dashboard_stats()?,
            None => escola_testkit::demo_stats(),
        };
        self.last_stats = Some(stats);
        Ok(stats)
    }

    fn load_chart(&mut self) -> Result<Option<ChartSpec>> {
        Ok(self.last_stats.map(chart_from_stats))
    }

    fn load_roster(&mut self, tab: TabKind) -> Result<Option<TableModel>> {
        let table = match (tab, &self.api) {
            (TabKind::Dashboard, _) => None,
            (TabKind::Alunos, Some(client)) => Some(aluno_table(&client.list_alunos()?)),
            (TabKind::Alunos, None) => Some(aluno_table(&escola_testkit::demo_alunos())),
            (TabKind::Professores, Some(client)) => {
                Some(professor_table(&client.list_professores()?))
            }
            (TabKind::Professores, None) => {
                Some(professor_table(&escola_testkit::demo_professores()))
            }
            (TabKind::Turmas, Some(client)) => Some(turma_table(&client.list_turmas()?)),
            (TabKind::Turmas, None) => Some(turma_table(&escola_testkit::demo_turmas())),
            (TabKind::Disciplinas, Some(client)) => {
                Some(disciplina_table(&client.list_disciplinas()?))
            }
            (TabKind::Disciplinas, None) => {
                Some(disciplina_table(&escola_testkit::demo_disciplinas()))
            }
        };
        Ok(table)
    }

    fn save_form_draft(
        &mut self,
        form_id: &str,
        snapshot: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.store.save_form(form_id, snapshot)
    }

    fn load_form_draft(&mut self, form_id: &str) -> Result<Option<BTreeMap<String, String>>> {
        self.store.load_form(form_id)
    }

    fn load_theme(&mut self) -> Result<Theme> {
        self.store.get_theme()
    }

    fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.put_theme(theme)
    }

    fn submit_requerimento(&mut self, input: &RequerimentoFormInput) -> Result<RequerimentoId> {
        match &self.api {
            Some(client) => Ok(client.submit_requerimento(input)?),
            // Demo mode accepts and discards the submission.
            None => Ok(RequerimentoId::new(0)),
        }
    }

    fn export_dir(&mut self) -> Result<PathBuf> {
        escola_store::export_dir()
    }
}

fn chart_from_stats(stats: DashboardStats) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        labels: vec![
            "alunos".to_owned(),
            "professores".to_owned(),
            "turmas".to_owned(),
            "disciplinas".to_owned(),
        ],
        values: vec![
            stats.students as f64,
            stats.teachers as f64,
            stats.classes as f64,
            stats.subjects as f64,
        ],
    }
}

fn aluno_table(alunos: &[Aluno]) -> TableModel {
    let mut table = TableModel::new(vec![
        Column::sortable("nome", "Nome"),
        Column::sortable("matricula", "Matrícula"),
        Column::sortable("turma", "Turma"),
        Column::sortable("status", "Status"),
    ]);
    for aluno in alunos {
        table.push_row(vec![
            aluno.nome.clone(),
            aluno.matricula.clone(),
            aluno.turma.clone(),
            aluno.status.clone(),
        ]);
    }
    table
}

fn professor_table(professores: &[Professor]) -> TableModel {
    let mut table = TableModel::new(vec![
        Column::sortable("nome", "Nome"),
        Column::sortable("matricula", "Matrícula"),
        Column::plain("email", "E-mail"),
        Column::sortable("status", "Status"),
    ]);
    for professor in professores {
        table.push_row(vec![
            professor.nome.clone(),
            professor.matricula.clone(),
            professor.email.clone(),
            professor.status.clone(),
        ]);
    }
    table
}

fn turma_table(turmas: &[Turma]) -> TableModel {
    let mut table = TableModel::new(vec![
        Column::sortable("nome", "Nome"),
        Column::sortable("ano", "Ano"),
        Column::sortable("turno", "Turno"),
        Column::plain("ativa", "Ativa"),
    ]);
    for turma in turmas {
        table.push_row(vec![
            turma.nome.clone(),
            turma.ano.to_string(),
            turma.turno.clone(),
            if turma.ativa { "sim" } else { "não" }.to_owned(),
        ]);
    }
    table
}

fn disciplina_table(disciplinas: &[Disciplina]) -> TableModel {
    let mut table = TableModel::new(vec![
        Column::sortable("nome", "Nome"),
        Column::sortable("codigo", "Código"),
        Column::sortable("carga_horaria", "Carga Horária"),
        Column::plain("ativa", "Ativa"),
    ]);
    for disciplina in disciplinas {
        table.push_row(vec![
            disciplina.nome.clone(),
            disciplina.codigo.clone(),
            disciplina.carga_horaria.to_string(),
            if disciplina.ativa { "sim" } else { "não" }.to_owned(),
        ]);
    }
    table
}
