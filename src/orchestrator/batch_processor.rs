//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，按顺序串起各个阶段：
//!
//! 1. **环境检查**：客户端密钥文件是否存在
//! 2. **数据采集**：逐项输入或批量粘贴，附加公共描述
//! 3. **封面配对**：预览、确认后才写入批次
//! 4. **授权**：通过 `CredentialProvider` 获取客户端，失败则终止
//! 5. **调度**：委托 `scheduler::schedule_batch` 逐场执行
//! 6. **汇总与导出**：显示结果，按需写入结果文件
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有凭证提供者的模块
//! - **向下委托**：不处理单场转播的细节
//! - 终端交互通过 `Prompter` 注入，测试时可替换为内存缓冲

use anyhow::Result;
use chrono::Utc;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::console::intake::{self, InputMode};
use crate::console::{Prompter, StdPrompter};
use crate::infrastructure::{CredentialProvider, FileCredentialStore, OAuthProvider};
use crate::models::broadcast::BroadcastRecordBatch;
use crate::orchestrator::aggregator::{aggregate, AggregatedReport};
use crate::orchestrator::scheduler::{schedule_batch, ScheduleOptions};
use crate::services::image_binder::ImageBinder;
use crate::services::record_parser::{past_schedule_warnings, RecordParser};
use crate::services::report_writer::{self, ReportWriter};
use crate::utils::logging;

/// 应用主结构
pub struct App<P: CredentialProvider> {
    config: Config,
    parser: RecordParser,
    binder: ImageBinder,
    provider: P,
}

impl App<OAuthProvider<FileCredentialStore>> {
    /// 初始化应用（OAuth + 本地令牌文件）
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(config.utc_offset_hours);

        let store = FileCredentialStore::new(config.token_file.clone());
        let provider = OAuthProvider::new(config.clone(), store);
        Self::with_provider(config, provider)
    }

    /// 在标准输入输出上运行
    pub async fn run(&self) -> Result<()> {
        let mut prompter = StdPrompter::stdio();
        self.run_with(&mut prompter).await?;
        Ok(())
    }
}

impl<P: CredentialProvider> App<P> {
    pub fn with_provider(config: Config, provider: P) -> Result<Self> {
        Ok(Self {
            parser: RecordParser::new()?,
            binder: ImageBinder::new(&config.image_extensions),
            config,
            provider,
        })
    }

    /// 运行完整流程
    ///
    /// 用户取消时返回 `Ok(None)`；授权失败返回错误。
    pub async fn run_with<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> Result<Option<AggregatedReport>> {
        p.say("=".repeat(50))?;
        p.say("=== AGENDADOR DE TRANSMISSÕES PARA YOUTUBE ===")?;
        p.say("=".repeat(50))?;

        if !self.check_client_secrets(p)? {
            return self.cancelled(p);
        }

        // 第一步：采集
        p.say("\n--- ETAPA 1: COLETA DE DADOS ---")?;
        let batch = self.collect(p)?;
        if batch.is_empty() {
            p.say("Nenhuma transmissão informada. Encerrando.")?;
            warn!("⚠️ 没有有效的转播，程序结束");
            return Ok(None);
        }

        // 第二步：封面
        p.say("\n--- ETAPA 2: SELEÇÃO DE CAPAS ---")?;
        let Some(batch) = self.bind_covers(p, batch).await? else {
            return self.cancelled(p);
        };

        // 第三步：确认
        p.say("\n--- ETAPA 3: CONFIRMAÇÃO ---")?;
        p.say("As transmissões serão criadas como 'não listadas'.")?;
        let publish = p.confirm("Deseja torná-las públicas logo após o agendamento?")?;
        if !p.confirm(&format!("Agendar {} transmissões agora?", batch.len()))? {
            return self.cancelled(p);
        }

        // 第四步：授权 + 调度
        p.say("\n--- ETAPA 4: AGENDAMENTO DAS TRANSMISSÕES ---")?;
        p.say("Autenticando com a API do YouTube...")?;
        let client = match self.provider.acquire_client().await {
            Ok(client) => client,
            Err(e) => {
                error!("❌ 授权失败: {}", e);
                p.say(format!("Erro ao autenticar com a API do YouTube: {}", e))?;
                return Err(e.into());
            }
        };
        p.say("Autenticação concluída com sucesso!")?;

        let options = ScheduleOptions {
            utc_offset: self.config.utc_offset()?,
            publish,
        };
        let report = schedule_batch(&client, batch, options).await;

        // 第五步：汇总
        let aggregated = aggregate(&report);
        p.say("\n--- ETAPA 5: RESULTADOS ---")?;
        p.say(report_writer::render(&aggregated))?;
        logging::print_final_stats(&aggregated.summary, &self.config.output_log_file);

        self.offer_save(p, &aggregated).await?;

        p.say("\nObrigado por usar o Agendador de Transmissões!")?;
        Ok(Some(aggregated))
    }

    /// 密钥文件缺失时显示获取说明，并询问是否继续
    fn check_client_secrets<R: BufRead, W: Write>(&self, p: &mut Prompter<R, W>) -> Result<bool> {
        let path = &self.config.client_secrets_file;
        if path.exists() {
            return Ok(true);
        }

        warn!("⚠️ 客户端密钥文件不存在: {}", path.display());
        p.say(format!(
            "\nATENÇÃO: o arquivo de segredos do cliente '{}' não foi encontrado.",
            path.display()
        ))?;
        p.say("Baixe-o no Console de Desenvolvedores do Google:")?;
        p.say("1. Acesse https://console.developers.google.com/")?;
        p.say("2. Crie um projeto (ou selecione um existente)")?;
        p.say("3. Ative a YouTube Data API v3 para o projeto")?;
        p.say("4. Crie credenciais OAuth 2.0 para aplicativo de desktop")?;
        p.say(format!("5. Baixe o arquivo JSON e salve-o como '{}'", path.display()))?;

        Ok(p.confirm("\nDeseja continuar mesmo assim?")?)
    }

    /// 采集记录、附加描述、提示已过去的时间
    fn collect<R: BufRead, W: Write>(&self, p: &mut Prompter<R, W>) -> Result<BroadcastRecordBatch> {
        let mode = intake::choose_mode(p)?;
        let description = intake::ask_description(p)?;

        let records = match mode {
            InputMode::Individual => intake::collect_individual(p, &self.parser)?,
            InputMode::Batch => {
                let parse = intake::collect_batch(p, &self.parser)?;
                info!(
                    "📝 批量文本: {} 个区块，{} 条有效，{} 条被忽略",
                    parse.block_count(),
                    parse.records.len(),
                    parse.errors.len()
                );
                parse.records
            }
        };

        let batch: BroadcastRecordBatch = records
            .into_iter()
            .map(|r| r.with_description(description.clone()))
            .collect();
        intake::show_records(p, &batch)?;

        let offset = self.config.utc_offset()?;
        let past = past_schedule_warnings(&batch, offset, Utc::now());
        for item in &past {
            warn!("⚠️ 转播 #{}「{}」的开始时间已过去", item.index, item.title);
        }
        intake::show_past_schedules(p, &past, offset)?;

        Ok(batch)
    }

    /// 封面配对：空路径表示不使用封面；出错或不确认时可重试
    async fn bind_covers<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
        batch: BroadcastRecordBatch,
    ) -> Result<Option<BroadcastRecordBatch>> {
        loop {
            let dir = p
                .ask("\nInforme a pasta que contém as capas (Enter para não usar capas): ")?
                .unwrap_or_default();
            if dir.is_empty() {
                info!("🖼️ 不使用封面");
                return Ok(Some(batch));
            }

            match self.binder.preview(&batch, Path::new(&dir)).await {
                Ok(preview) => {
                    if let Some(warning) = &preview.warning {
                        warn!("⚠️ {}", warning);
                    }
                    if intake::confirm_preview(p, &preview)? {
                        info!("🖼️ 已绑定 {} 张封面", preview.bound_count());
                        return Ok(Some(preview.bind(batch)));
                    }
                    p.say("Associação cancelada.")?;
                }
                Err(e) => {
                    warn!("⚠️ {}", e);
                    p.say(format!("Erro: {}", e))?;
                }
            }

            if !p.confirm("Deseja tentar novamente?")? {
                return Ok(None);
            }
        }
    }

    /// 询问是否导出结果文件，写入失败不影响结果
    async fn offer_save<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
        report: &AggregatedReport,
    ) -> Result<()> {
        if !p.confirm("\nDeseja salvar os resultados em um arquivo?")? {
            return Ok(());
        }

        let default = &self.config.results_file;
        let answer = p
            .ask(&format!("Nome do arquivo (padrão: {}): ", default.display()))?
            .unwrap_or_default();
        let path = if answer.is_empty() {
            default.clone()
        } else {
            PathBuf::from(answer)
        };

        let writer = ReportWriter::with_path(path);
        match writer.write(report).await {
            Ok(()) => {
                info!("💾 结果已保存: {}", writer.path().display());
                p.say(format!("\nResultados salvos no arquivo: {}", writer.path().display()))?;
            }
            Err(e) => {
                error!("❌ 保存结果失败: {:#}", e);
                p.say(format!("\nErro ao salvar resultados: {:#}", e))?;
            }
        }
        Ok(())
    }

    fn cancelled<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> Result<Option<AggregatedReport>> {
        info!("用户取消操作");
        p.say("Operação cancelada pelo usuário.")?;
        Ok(None)
    }
}
